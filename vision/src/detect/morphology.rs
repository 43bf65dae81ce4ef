use opencv::core::{Mat, Size};
use opencv::imgproc::{get_structuring_element_def, morphology_ex_def, MORPH_CLOSE, MORPH_RECT};

use crate::error::Result;

/// Morphological closing (dilation then erosion) with a square structuring
/// element. Merges adjacent fragments of one real object and fills small
/// gaps; a kernel of 1 degenerates to the identity.
pub fn close(mask: &Mat, kernel: i32) -> Result<Mat> {
    if kernel <= 1 {
        return Ok(mask.clone());
    }

    let element = get_structuring_element_def(MORPH_RECT, Size::new(kernel, kernel))?;
    let mut closed = Mat::default();
    morphology_ex_def(mask, &mut closed, MORPH_CLOSE, &element)?;

    Ok(closed)
}
