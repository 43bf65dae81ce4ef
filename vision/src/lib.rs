mod detect;
mod enhance;
mod error;
mod preprocess;
mod scene;
mod utils;

use opencv::core::Mat;
use opencv::prelude::*;
use rayon::prelude::*;

pub use detect::{annotate, apply_exclusions, close, diff, extract_regions, Region};
pub use enhance::{CurveEnhancer, Enhancer, IdentityEnhancer};
pub use error::{Result, VisionError};
pub use preprocess::{preprocess, PreprocessMode};
pub use scene::{Polygon, ReferenceRegistry, SceneContext, ZoneCatalog};

/// Tunables of the comparison pipeline. The two difference cutoffs are kept
/// independent: edge maps are sparse and register a change at a lower bar
/// than plain grayscale.
#[derive(Debug, Clone)]
pub struct DetectionParams {
    pub blur_kernel: i32,
    pub canny_low: f64,
    pub canny_high: f64,
    pub cutoff_plain: f64,
    pub cutoff_edge: f64,
    pub close_kernel: i32,
    pub min_side: i32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 200.0,
            canny_high: 300.0,
            cutoff_plain: 75.0,
            cutoff_edge: 30.0,
            close_kernel: 5,
            min_side: 25,
        }
    }
}

impl DetectionParams {
    fn cutoff(&self, mode: PreprocessMode) -> f64 {
        match mode {
            PreprocessMode::Plain => self.cutoff_plain,
            PreprocessMode::Edge => self.cutoff_edge,
        }
    }
}

/// The detection pipeline: given a camera's current frame, report the
/// bounding boxes of objects not present in that camera's reference frame.
///
/// Holds only immutable state (scene data, tunables, enhancer weights), so
/// one instance serves any number of camera streams concurrently.
pub struct Detector {
    context: SceneContext,
    params: DetectionParams,
    enhancer: Box<dyn Enhancer>,
}

impl Detector {
    pub fn new(context: SceneContext, enhancer: Box<dyn Enhancer>) -> Self {
        Self::with_params(context, enhancer, DetectionParams::default())
    }

    pub fn with_params(
        context: SceneContext,
        enhancer: Box<dyn Enhancer>,
        params: DetectionParams,
    ) -> Self {
        Self {
            context,
            params,
            enhancer,
        }
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    /// Run one full comparison of `current` against the camera's reference.
    ///
    /// The camera must be present in both the reference registry and the
    /// zone catalog; that is checked before any pixel work happens.
    pub fn detect_frame(
        &self,
        camera: u32,
        current: &Mat,
        mode: PreprocessMode,
    ) -> Result<Vec<Region>> {
        let reference = self.context.reference(camera)?;
        let zones = self.context.zones(camera)?;

        let reference = self.enhanced(reference)?;
        let current = self.enhanced(current)?;

        let reference_pre = preprocess(&reference, mode, &self.params)?;
        let current_pre = preprocess(&current, mode, &self.params)?;

        let mask = diff(&reference_pre, &current_pre, self.params.cutoff(mode))?;
        let masked = apply_exclusions(&mask, zones)?;
        let cleaned = close(&masked, self.params.close_kernel)?;

        let regions = extract_regions(&cleaned, self.params.min_side)?;
        log::debug!(
            "camera {camera}: {} region(s) after exclusion and size filtering",
            regions.len()
        );

        Ok(regions)
    }

    /// Same as [`detect_frame`](Self::detect_frame), plus a copy of the
    /// current frame with boxes and zone outlines drawn for inspection.
    pub fn detect_frame_annotated(
        &self,
        camera: u32,
        current: &Mat,
        mode: PreprocessMode,
    ) -> Result<(Vec<Region>, Mat)> {
        let regions = self.detect_frame(camera, current, mode)?;
        let annotated = annotate(current, &regions, self.context.zones(camera)?)?;

        Ok((regions, annotated))
    }

    /// Run many cameras' frames against the shared immutable context, one
    /// worker per frame. Failures stay per-frame; one bad camera id does
    /// not poison the batch.
    pub fn detect_batch(
        &self,
        frames: &[(u32, Mat)],
        mode: PreprocessMode,
    ) -> Vec<Result<Vec<Region>>> {
        frames
            .par_iter()
            .map(|(camera, frame)| self.detect_frame(*camera, frame, mode))
            .collect()
    }

    fn enhanced(&self, frame: &Mat) -> Result<Mat> {
        let out = self.enhancer.enhance(frame)?;
        if out.size()? != frame.size()? || out.typ() != frame.typ() {
            return Err(VisionError::Enhancement {
                reason: "enhancer changed the frame shape".to_string(),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    const CAMERA: u32 = 7;

    fn uniform_frame(value: f64) -> Mat {
        Mat::new_rows_cols_with_default(720, 1280, CV_8UC3, Scalar::all(value)).unwrap()
    }

    fn paint_square(frame: &mut Mat, x: i32, y: i32, side: i32, value: u8) {
        for yy in y..y + side {
            for xx in x..x + side {
                *frame.at_2d_mut::<Vec3b>(yy, xx).unwrap() = Vec3b::from([value, value, value]);
            }
        }
    }

    fn quad(points: [(i32, i32); 4]) -> Polygon {
        Polygon::new(points.iter().map(|(x, y)| Vector2::new(*x, *y)).collect())
    }

    /// Camera 7's installation: six fixed zones over reflective glass.
    fn camera7_zones() -> Vec<Polygon> {
        vec![
            quad([(770, 90), (1040, 100), (1040, 395), (770, 290)]),
            quad([(1125, 120), (1265, 147), (1265, 525), (1125, 470)]),
            quad([(425, 75), (730, 75), (730, 175), (425, 175)]),
            quad([(50, 40), (200, 40), (200, 140), (50, 140)]),
            quad([(900, 500), (1100, 520), (1080, 680), (880, 660)]),
            quad([(140, 300), (260, 320), (250, 430), (140, 410)]),
        ]
    }

    fn detector(reference: Mat) -> Detector {
        let registry = ReferenceRegistry::new([(CAMERA, reference)]);
        let catalog = ZoneCatalog::new([(CAMERA, camera7_zones())]);
        Detector::new(SceneContext::new(registry, catalog), Box::new(IdentityEnhancer))
    }

    #[test]
    fn identical_frames_yield_no_detections() {
        let detector = detector(uniform_frame(30.0));
        let current = uniform_frame(30.0);

        let regions = detector
            .detect_frame(CAMERA, &current, PreprocessMode::Plain)
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn inserted_square_is_detected_outside_zones() {
        let detector = detector(uniform_frame(30.0));
        let mut current = uniform_frame(30.0);
        paint_square(&mut current, 300, 300, 50, 200);

        let regions = detector
            .detect_frame(CAMERA, &current, PreprocessMode::Plain)
            .unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].min, Vector2::new(300, 300));
        assert_eq!(regions[0].max, Vector2::new(350, 350));
    }

    #[test]
    fn inserted_square_inside_zone_is_suppressed() {
        let detector = detector(uniform_frame(30.0));
        let mut current = uniform_frame(30.0);
        // Fully inside the (425,75)-(730,175) glass zone.
        paint_square(&mut current, 450, 100, 50, 200);

        let regions = detector
            .detect_frame(CAMERA, &current, PreprocessMode::Plain)
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn edge_mode_detects_the_same_square() {
        let detector = detector(uniform_frame(20.0));
        let mut current = uniform_frame(20.0);
        paint_square(&mut current, 300, 300, 50, 255);

        let regions = detector
            .detect_frame(CAMERA, &current, PreprocessMode::Edge)
            .unwrap();

        assert_eq!(regions.len(), 1);
        // Blur and closing smear the outline by a few pixels.
        assert!((regions[0].min.x - 300).abs() <= 4);
        assert!((regions[0].min.y - 300).abs() <= 4);
        assert!((regions[0].width() - 50).abs() <= 8);
        assert!((regions[0].height() - 50).abs() <= 8);
    }

    #[test]
    fn unknown_camera_fails_before_any_pixel_work() {
        let detector = detector(uniform_frame(30.0));

        // An empty current frame would fail preprocessing, so getting
        // UnknownCamera back proves the lookup happens first.
        let result = detector.detect_frame(99, &Mat::default(), PreprocessMode::Plain);
        assert!(matches!(
            result,
            Err(VisionError::UnknownCamera { camera: 99 })
        ));
    }

    #[test]
    fn delta_below_plain_cutoff_is_background() {
        let detector = detector(uniform_frame(100.0));
        // 75 above the reference everywhere: not strictly greater than the
        // cutoff, so the whole frame stays background.
        let current = uniform_frame(175.0);

        let regions = detector
            .detect_frame(CAMERA, &current, PreprocessMode::Plain)
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn annotated_variant_returns_boxes_and_a_new_frame() {
        let detector = detector(uniform_frame(30.0));
        let mut current = uniform_frame(30.0);
        paint_square(&mut current, 300, 300, 50, 200);

        let (regions, annotated) = detector
            .detect_frame_annotated(CAMERA, &current, PreprocessMode::Plain)
            .unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(annotated.size().unwrap(), current.size().unwrap());
        // The current frame itself is untouched by annotation.
        assert_eq!(
            *current.at_2d::<Vec3b>(300, 325).unwrap(),
            Vec3b::from([200, 200, 200])
        );
    }

    #[test]
    fn batch_runs_cameras_independently() {
        let detector = detector(uniform_frame(30.0));
        let mut with_object = uniform_frame(30.0);
        paint_square(&mut with_object, 300, 300, 50, 200);

        let frames = vec![
            (CAMERA, uniform_frame(30.0)),
            (CAMERA, with_object),
            (99, uniform_frame(30.0)),
        ];

        let results = detector.detect_batch(&frames, PreprocessMode::Plain);

        assert!(results[0].as_ref().unwrap().is_empty());
        assert_eq!(results[1].as_ref().unwrap().len(), 1);
        assert!(matches!(
            results[2],
            Err(VisionError::UnknownCamera { camera: 99 })
        ));
    }

    #[test]
    fn shape_shifting_enhancer_is_rejected() {
        struct Cropping;

        impl Enhancer for Cropping {
            fn enhance(&self, frame: &Mat) -> Result<Mat> {
                let roi = Mat::roi(frame, opencv::core::Rect::new(0, 0, 10, 10))?;
                Ok(roi.clone_pointee())
            }
        }

        let registry = ReferenceRegistry::new([(CAMERA, uniform_frame(30.0))]);
        let catalog = ZoneCatalog::new([(CAMERA, vec![])]);
        let detector = Detector::new(SceneContext::new(registry, catalog), Box::new(Cropping));

        let result = detector.detect_frame(CAMERA, &uniform_frame(30.0), PreprocessMode::Plain);
        assert!(matches!(result, Err(VisionError::Enhancement { .. })));
    }
}
