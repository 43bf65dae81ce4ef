use thiserror::Error;

/// Failure kinds of the detection pipeline and its collaborators.
///
/// Every variant is returned to the caller; nothing here terminates the
/// process. `UnknownCamera` and `VideoRead` are recoverable per request,
/// the rest abort processing of a single frame.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("camera {camera} is not configured with a reference frame and exclusion zones")]
    UnknownCamera { camera: u32 },

    #[error("invalid input frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("preprocessed frame shapes differ: {expected_rows}x{expected_cols} vs {actual_rows}x{actual_cols}")]
    ShapeMismatch {
        expected_rows: i32,
        expected_cols: i32,
        actual_rows: i32,
        actual_cols: i32,
    },

    #[error("low-light enhancement failed: {reason}")]
    Enhancement { reason: String },

    #[error("could not read frame {frame} from {path}")]
    VideoRead { path: String, frame: i32 },

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T> = std::result::Result<T, VisionError>;
