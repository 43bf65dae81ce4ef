use opencv::core::{absdiff, Mat};
use opencv::imgproc::{threshold, THRESH_BINARY};
use opencv::prelude::*;

use crate::error::{Result, VisionError};

/// Per-pixel absolute difference of two equally-shaped single-channel
/// buffers, binarized at `cutoff`. A pixel is marked as differing iff
/// |a - b| is strictly greater than the cutoff.
pub fn diff(a: &Mat, b: &Mat, cutoff: f64) -> Result<Mat> {
    if a.size()? != b.size()? || a.typ() != b.typ() {
        return Err(VisionError::ShapeMismatch {
            expected_rows: a.rows(),
            expected_cols: a.cols(),
            actual_rows: b.rows(),
            actual_cols: b.cols(),
        });
    }

    let mut delta = Mat::default();
    absdiff(a, b, &mut delta)?;

    let mut mask = Mat::default();
    threshold(&delta, &mut mask, cutoff, 255.0, THRESH_BINARY)?;

    Ok(mask)
}
