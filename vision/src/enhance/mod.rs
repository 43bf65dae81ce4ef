mod dce;

pub use dce::CurveEnhancer;

use opencv::core::Mat;

use crate::error::Result;

/// Image-to-image low-light correction collaborator. Implementations must
/// return a frame of identical dimensions and channel count; the pipeline
/// rejects anything else as an enhancement failure.
pub trait Enhancer: Send + Sync {
    fn enhance(&self, frame: &Mat) -> Result<Mat>;
}

/// Pass-through enhancer for well-lit footage and for tests.
pub struct IdentityEnhancer;

impl Enhancer for IdentityEnhancer {
    fn enhance(&self, frame: &Mat) -> Result<Mat> {
        Ok(frame.clone())
    }
}
