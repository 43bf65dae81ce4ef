use std::collections::HashMap;

use opencv::core::Mat;

use crate::error::{Result, VisionError};

/// Camera id to reference frame lookup.
///
/// A reference frame is a capture of the camera's scene known to contain no
/// extraneous objects. Entries are handed over whole at construction; the
/// registry never changes afterwards, so lookups are safe from any thread.
pub struct ReferenceRegistry {
    frames: HashMap<u32, Mat>,
}

impl ReferenceRegistry {
    pub fn new(entries: impl IntoIterator<Item = (u32, Mat)>) -> Self {
        Self {
            frames: entries.into_iter().collect(),
        }
    }

    pub fn reference(&self, camera: u32) -> Result<&Mat> {
        self.frames
            .get(&camera)
            .ok_or(VisionError::UnknownCamera { camera })
    }

    pub fn cameras(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.keys().copied()
    }
}
