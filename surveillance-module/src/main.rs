mod config;
mod video;

use std::path::Path;

use anyhow::Context;
use opencv::imgcodecs::imwrite_def;
use vision::{
    CurveEnhancer, Detector, Enhancer, IdentityEnhancer, ReferenceRegistry, SceneContext,
    VisionError, ZoneCatalog,
};

fn main() -> anyhow::Result<()> {
    setup_logging();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    log::info!("Loading configuration from {config_path}");
    let config = config::load(Path::new(&config_path))?;
    let zones = config::load_zone_defs(&config.zones_file)?;
    let run = config.run;

    log::info!(
        "Reading reference frame {} of camera {}",
        run.reference_frame,
        run.camera
    );
    let reference = video::VideoSource::open(&config.videos.path.join(&run.reference_video))?
        .frame_at(run.reference_frame)?;

    let enhancer: Box<dyn Enhancer> = match &config.enhancer_weights {
        Some(weights) => {
            log::info!("Loading enhancement network from {}", weights.display());
            Box::new(CurveEnhancer::load(weights)?)
        }
        None => Box::new(IdentityEnhancer),
    };

    let registry = ReferenceRegistry::new([(run.camera, reference)]);
    let catalog = ZoneCatalog::new(zones);
    let detector = Detector::new(SceneContext::new(registry, catalog), enhancer);

    log::info!("Reading frame {} from {}", run.current_frame, run.current_video);
    let mut source = video::VideoSource::open(&config.videos.path.join(&run.current_video))?;
    let current = match source.frame_at(run.current_frame) {
        Ok(frame) => frame,
        Err(e @ VisionError::VideoRead { .. }) => {
            log::error!("Skipping unreadable frame: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let (regions, annotated) =
        detector.detect_frame_annotated(run.camera, &current, run.mode.into())?;

    log::info!(
        "camera {}: {} object(s) newly present in frame {}",
        run.camera,
        regions.len(),
        run.current_frame
    );
    for region in &regions {
        log::info!(
            "  object at ({}, {}), {}x{} px",
            region.min.x,
            region.min.y,
            region.width(),
            region.height()
        );
    }

    if let Some(output) = &run.output_image {
        imwrite_def(&output.to_string_lossy(), &annotated)
            .with_context(|| format!("could not write {}", output.display()))?;
        log::info!("Annotated frame written to {}", output.display());
    }

    Ok(())
}

fn setup_logging() {
    simple_log::quick!();
}
