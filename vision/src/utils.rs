use candle_core::{Device, Tensor};
use opencv::core::{Mat, Scalar, Vec3b, CV_8UC3};
use opencv::prelude::*;

use crate::error::{Result, VisionError};

fn tensor_err(e: candle_core::Error) -> VisionError {
    VisionError::Enhancement {
        reason: e.to_string(),
    }
}

/// Convert an 8-bit BGR frame into a normalized [1, 3, rows, cols] RGB
/// tensor for the enhancement network.
pub fn mat_to_rgb_tensor(mat: &Mat, device: &Device) -> Result<Tensor> {
    if mat.typ() != CV_8UC3 {
        return Err(VisionError::InvalidFrame {
            reason: "enhancement expects an 8-bit 3-channel frame".to_string(),
        });
    }

    let rows = mat.rows() as usize;
    let cols = mat.cols() as usize;
    let plane = rows * cols;
    let mut data = vec![0f32; 3 * plane];

    for r in 0..rows {
        for c in 0..cols {
            let px = mat.at_2d::<Vec3b>(r as i32, c as i32)?;
            // Mat stores BGR, the network runs on RGB planes.
            data[r * cols + c] = px[2] as f32 / 255.0;
            data[plane + r * cols + c] = px[1] as f32 / 255.0;
            data[2 * plane + r * cols + c] = px[0] as f32 / 255.0;
        }
    }

    Tensor::from_vec(data, (1, 3, rows, cols), device).map_err(tensor_err)
}

/// Convert a [1, 3, rows, cols] RGB tensor in [0, 1] back into an 8-bit
/// BGR frame.
pub fn rgb_tensor_to_mat(tensor: &Tensor) -> Result<Mat> {
    let planes = tensor
        .squeeze(0)
        .and_then(|t| t.clamp(0f32, 1f32))
        .and_then(|t| t.to_vec3::<f32>())
        .map_err(tensor_err)?;

    let rows = planes[0].len();
    let cols = planes[0][0].len();
    let mut mat =
        Mat::new_rows_cols_with_default(rows as i32, cols as i32, CV_8UC3, Scalar::all(0.0))?;

    for r in 0..rows {
        for c in 0..cols {
            let to_byte = |v: f32| (v * 255.0).round() as u8;
            *mat.at_2d_mut::<Vec3b>(r as i32, c as i32)? = Vec3b::from([
                to_byte(planes[2][r][c]),
                to_byte(planes[1][r][c]),
                to_byte(planes[0][r][c]),
            ]);
        }
    }

    Ok(mat)
}
