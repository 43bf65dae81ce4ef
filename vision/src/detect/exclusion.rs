use opencv::core::{Mat, Point, Scalar, Vector};
use opencv::imgproc::fill_poly_def;

use crate::error::Result;
use crate::scene::Polygon;

/// Zero out every mask pixel that falls inside an exclusion polygon.
///
/// The diff mask is computed once by the caller; all zones are filled on a
/// single copy in one pass. Filling is per-pixel idempotent, so re-applying
/// the same zones (in any order) changes nothing.
pub fn apply_exclusions(mask: &Mat, zones: &[Polygon]) -> Result<Mat> {
    let mut masked = mask.clone();
    if zones.is_empty() {
        return Ok(masked);
    }

    let outlines: Vector<Vector<Point>> = zones.iter().map(Polygon::to_cv_points).collect();
    fill_poly_def(&mut masked, &outlines, Scalar::all(0.0))?;

    Ok(masked)
}
