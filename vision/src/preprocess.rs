use opencv::core::{Mat, Size, CV_8UC1, CV_8UC3};
use opencv::imgproc::{canny_def, cvt_color_def, gaussian_blur_def, COLOR_BGR2GRAY};
use opencv::prelude::*;

use crate::error::{Result, VisionError};
use crate::DetectionParams;

/// Comparison-ready representation of a frame. Reference and current frame
/// must go through the same variant with the same parameters; the pipeline
/// guarantees that by preprocessing both with one mode value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessMode {
    /// Plain single-channel grayscale.
    Plain,
    /// Grayscale, Gaussian blur, then Canny edge map.
    Edge,
}

pub fn preprocess(frame: &Mat, mode: PreprocessMode, params: &DetectionParams) -> Result<Mat> {
    let gray = to_gray(frame)?;

    match mode {
        PreprocessMode::Plain => Ok(gray),
        PreprocessMode::Edge => {
            let mut blurred = Mat::default();
            gaussian_blur_def(
                &gray,
                &mut blurred,
                Size::new(params.blur_kernel, params.blur_kernel),
                0.0,
            )?;
            let mut edges = Mat::default();
            canny_def(&blurred, &mut edges, params.canny_low, params.canny_high)?;
            Ok(edges)
        }
    }
}

fn to_gray(frame: &Mat) -> Result<Mat> {
    if frame.empty() {
        return Err(VisionError::InvalidFrame {
            reason: "empty buffer".to_string(),
        });
    }

    match frame.typ() {
        CV_8UC1 => Ok(frame.clone()),
        CV_8UC3 => {
            let mut gray = Mat::default();
            cvt_color_def(frame, &mut gray, COLOR_BGR2GRAY)?;
            Ok(gray)
        }
        typ => Err(VisionError::InvalidFrame {
            reason: format!("unsupported pixel type {typ}"),
        }),
    }
}
