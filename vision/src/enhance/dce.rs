use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, Module, VarBuilder, VarMap};
use opencv::core::Mat;
use opencv::prelude::*;

use crate::error::{Result, VisionError};
use crate::utils::{mat_to_rgb_tensor, rgb_tensor_to_mat};

use super::Enhancer;

const FEATURES: usize = 32;
const CURVE_ITERATIONS: usize = 8;

fn enhancement_err(e: candle_core::Error) -> VisionError {
    VisionError::Enhancement {
        reason: e.to_string(),
    }
}

/// Curve-estimation low-light enhancer.
///
/// Seven 3x3 convolution layers with skip concatenations estimate
/// `CURVE_ITERATIONS` per-pixel curve maps; the input is brightened by
/// iterating `x <- x + r * (x^2 - x)`. Weights come from a safetensors
/// snapshot of the trained network; training itself happens elsewhere.
pub struct CurveEnhancer {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    conv4: Conv2d,
    conv5: Conv2d,
    conv6: Conv2d,
    conv7: Conv2d,
    device: Device,
}

impl CurveEnhancer {
    pub fn load(weights: impl AsRef<Path>) -> Result<Self> {
        let device = Device::Cpu;
        let mut varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let make = |inp, out, name: &str| {
            conv2d(inp, out, 3, cfg, vs.pp(name)).map_err(enhancement_err)
        };

        let enhancer = Self {
            conv1: make(3, FEATURES, "e_conv1")?,
            conv2: make(FEATURES, FEATURES, "e_conv2")?,
            conv3: make(FEATURES, FEATURES, "e_conv3")?,
            conv4: make(FEATURES, FEATURES, "e_conv4")?,
            conv5: make(FEATURES * 2, FEATURES, "e_conv5")?,
            conv6: make(FEATURES * 2, FEATURES, "e_conv6")?,
            conv7: make(FEATURES * 2, 3 * CURVE_ITERATIONS, "e_conv7")?,
            device,
        };
        varmap.load(weights).map_err(enhancement_err)?;

        Ok(enhancer)
    }

    fn estimate_curves(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let x1 = self.conv1.forward(x)?.relu()?;
        let x2 = self.conv2.forward(&x1)?.relu()?;
        let x3 = self.conv3.forward(&x2)?.relu()?;
        let x4 = self.conv4.forward(&x3)?.relu()?;
        let x5 = self.conv5.forward(&Tensor::cat(&[&x3, &x4], 1)?)?.relu()?;
        let x6 = self.conv6.forward(&Tensor::cat(&[&x2, &x5], 1)?)?.relu()?;
        self.conv7.forward(&Tensor::cat(&[&x1, &x6], 1)?)?.tanh()
    }
}

fn apply_curves(x: &Tensor, curves: &Tensor) -> candle_core::Result<Tensor> {
    let mut out = x.clone();
    for r in curves.chunk(CURVE_ITERATIONS, 1)? {
        let adjust = (out.sqr()? - &out)?;
        out = (&out + (&r * &adjust)?)?;
    }
    Ok(out)
}

impl Enhancer for CurveEnhancer {
    fn enhance(&self, frame: &Mat) -> Result<Mat> {
        let input = mat_to_rgb_tensor(frame, &self.device)?;
        let curves = self.estimate_curves(&input).map_err(enhancement_err)?;
        let enhanced = apply_curves(&input, &curves).map_err(enhancement_err)?;

        let out = rgb_tensor_to_mat(&enhanced)?;
        if out.size()? != frame.size()? {
            return Err(VisionError::Enhancement {
                reason: "network returned a differently sized image".to_string(),
            });
        }
        Ok(out)
    }
}
