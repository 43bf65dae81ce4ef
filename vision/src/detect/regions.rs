use itertools::Itertools;
use nalgebra::Vector2;
use opencv::core::{Mat, Point, Rect, Vector};
use opencv::imgproc::{
    bounding_rect, contour_area_def, find_contours_def, CHAIN_APPROX_SIMPLE, RETR_EXTERNAL,
};

use crate::error::Result;

/// Axis-aligned bounding box of one connected set of differing pixels,
/// stored as min/max corners in frame coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub min: Vector2<i32>,
    pub max: Vector2<i32>,
}

impl Region {
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min.x, self.min.y, self.width(), self.height())
    }
}

/// Extract candidate object regions from a cleaned difference mask.
///
/// Only external contours are considered; holes inside a blob are part of
/// that blob. A component survives iff its boundary-polygon area is
/// strictly greater than `min_side` squared, so the knob reads as "ignore
/// anything smaller than a min_side x min_side patch". The result is
/// sorted by bounding-box origin (x, then y), then extent, so identical
/// masks always produce the identical list.
pub fn extract_regions(mask: &Mat, min_side: i32) -> Result<Vec<Region>> {
    let mut contours: Vector<Vector<Point>> = Vector::new();
    find_contours_def(mask, &mut contours, RETR_EXTERNAL, CHAIN_APPROX_SIMPLE)?;

    let min_area = f64::from(min_side) * f64::from(min_side);

    let regions: Result<Vec<Option<Region>>> = contours
        .iter()
        .map(|contour| {
            if contour_area_def(&contour)? <= min_area {
                return Ok(None);
            }
            let rect = bounding_rect(&contour)?;

            Ok(Some(Region {
                min: Vector2::new(rect.x, rect.y),
                max: Vector2::new(rect.x + rect.width, rect.y + rect.height),
            }))
        })
        .collect();

    Ok(regions?
        .into_iter()
        .flatten()
        .sorted_by_key(|r| (r.min.x, r.min.y, r.max.x, r.max.y))
        .collect_vec())
}
