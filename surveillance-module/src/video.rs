use std::path::Path;

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY, CAP_PROP_POS_FRAMES};
use vision::{Result, VisionError};

/// Seek-by-index frame reader over a stored video file.
///
/// Read failures are returned as recoverable errors; whether to skip the
/// frame or stop the run is the caller's decision.
pub struct VideoSource {
    capture: VideoCapture,
    path: String,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self> {
        let path = path.to_string_lossy().into_owned();
        let capture = VideoCapture::from_file(&path, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(VisionError::VideoRead { path, frame: 0 });
        }

        Ok(Self { capture, path })
    }

    pub fn frame_at(&mut self, index: i32) -> Result<Mat> {
        self.capture.set(CAP_PROP_POS_FRAMES, f64::from(index))?;

        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(VisionError::VideoRead {
                path: self.path.clone(),
                frame: index,
            });
        }

        Ok(frame)
    }
}
