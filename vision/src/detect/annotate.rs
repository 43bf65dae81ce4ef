use opencv::core::{Mat, Point, Scalar, Vector};
use opencv::imgproc::{polylines, rectangle, LINE_8};

use crate::error::Result;
use crate::scene::Polygon;

use super::Region;

const THICKNESS: i32 = 2;

// BGR: green boxes for detections, blue outlines for exclusion zones.
fn region_color() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn zone_color() -> Scalar {
    Scalar::new(255.0, 0.0, 0.0, 0.0)
}

/// Render detected regions and exclusion-zone outlines onto a copy of the
/// current frame for visual inspection. The input frame is left untouched;
/// no window, no I/O.
pub fn annotate(frame: &Mat, regions: &[Region], zones: &[Polygon]) -> Result<Mat> {
    let mut canvas = frame.clone();

    for region in regions {
        rectangle(
            &mut canvas,
            region.to_rect(),
            region_color(),
            THICKNESS,
            LINE_8,
            0,
        )?;
    }

    if !zones.is_empty() {
        let outlines: Vector<Vector<Point>> = zones.iter().map(Polygon::to_cv_points).collect();
        polylines(&mut canvas, &outlines, true, zone_color(), THICKNESS, LINE_8, 0)?;
    }

    Ok(canvas)
}
