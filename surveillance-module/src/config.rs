use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nalgebra::Vector2;
use serde::Deserialize;
use vision::{Polygon, PreprocessMode};

/// Runtime configuration of the module, one JSON file.
#[derive(Debug, Deserialize)]
pub struct ModuleConfig {
    pub videos: VideoConfig,
    pub zones_file: PathBuf,
    #[serde(default)]
    pub enhancer_weights: Option<PathBuf>,
    pub run: RunConfig,
}

#[derive(Debug, Deserialize)]
pub struct VideoConfig {
    /// Root directory of the stored video assets.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub camera: u32,
    pub reference_video: String,
    pub reference_frame: i32,
    pub current_video: String,
    pub current_frame: i32,
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default)]
    pub output_image: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeConfig {
    #[default]
    Plain,
    Edge,
}

impl From<ModeConfig> for PreprocessMode {
    fn from(mode: ModeConfig) -> Self {
        match mode {
            ModeConfig::Plain => PreprocessMode::Plain,
            ModeConfig::Edge => PreprocessMode::Edge,
        }
    }
}

pub fn load(path: &Path) -> Result<ModuleConfig> {
    let file = File::open(path)
        .with_context(|| format!("could not open configuration file {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed configuration in {}", path.display()))?;
    Ok(config)
}

// --- Exclusion-zone definitions ---

#[derive(Debug, Deserialize)]
pub struct ZoneDef {
    pub id: u32,
    pub camera: u32,
    pub points: Vec<PointDef>,
}

#[derive(Debug, Deserialize)]
pub struct PointDef {
    pub x: i32,
    pub y: i32,
}

/// Load per-camera exclusion polygons from a JSON definitions file.
/// Definitions with fewer than three vertices cannot enclose an area and
/// are skipped with a warning.
pub fn load_zone_defs(path: &Path) -> Result<HashMap<u32, Vec<Polygon>>> {
    let file = File::open(path)
        .with_context(|| format!("could not open zone definitions {}", path.display()))?;
    let defs: Vec<ZoneDef> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed zone definitions in {}", path.display()))?;

    Ok(collect_zones(defs))
}

fn collect_zones(defs: Vec<ZoneDef>) -> HashMap<u32, Vec<Polygon>> {
    let mut zones: HashMap<u32, Vec<Polygon>> = HashMap::new();

    for def in defs {
        if def.points.len() < 3 {
            log::warn!(
                "skipping zone {} of camera {}: only {} point(s)",
                def.id,
                def.camera,
                def.points.len()
            );
            continue;
        }

        let vertices = def.points.iter().map(|p| Vector2::new(p.x, p.y)).collect();
        zones.entry(def.camera).or_default().push(Polygon::new(vertices));
    }

    zones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_with_defaults() {
        let raw = r#"{
            "videos": { "path": "assets/videos" },
            "zones_file": "zones.json",
            "run": {
                "camera": 7,
                "reference_video": "ref.mp4",
                "reference_frame": 100,
                "current_video": "cur.mp4",
                "current_frame": 3600
            }
        }"#;

        let config: ModuleConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.run.camera, 7);
        assert!(matches!(config.run.mode, ModeConfig::Plain));
        assert!(config.enhancer_weights.is_none());
        assert!(config.run.output_image.is_none());
    }

    #[test]
    fn edge_mode_is_selectable() {
        let raw = r#"{
            "camera": 7,
            "reference_video": "ref.mp4",
            "reference_frame": 0,
            "current_video": "cur.mp4",
            "current_frame": 1,
            "mode": "edge"
        }"#;

        let run: RunConfig = serde_json::from_str(raw).unwrap();
        assert!(matches!(PreprocessMode::from(run.mode), PreprocessMode::Edge));
    }

    #[test]
    fn degenerate_zones_are_skipped() {
        let raw = r#"[
            { "id": 1, "camera": 7, "points": [
                {"x": 770, "y": 90}, {"x": 1040, "y": 100},
                {"x": 1040, "y": 395}, {"x": 770, "y": 290} ] },
            { "id": 2, "camera": 7, "points": [ {"x": 0, "y": 0}, {"x": 10, "y": 0} ] },
            { "id": 3, "camera": 9, "points": [
                {"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 10} ] }
        ]"#;

        let defs: Vec<ZoneDef> = serde_json::from_str(raw).unwrap();
        let zones = collect_zones(defs);

        assert_eq!(zones[&7].len(), 1);
        assert_eq!(zones[&7][0].vertices().len(), 4);
        assert_eq!(zones[&9].len(), 1);
    }
}
