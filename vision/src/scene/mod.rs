mod registry;
mod zones;

pub use registry::ReferenceRegistry;
pub use zones::{Polygon, ZoneCatalog};

use opencv::core::Mat;

use crate::error::Result;

/// Immutable per-installation data: one reference frame and one ordered
/// exclusion-zone list per camera. Built once at startup and shared by
/// reference across workers; there is no mutation API after construction.
pub struct SceneContext {
    registry: ReferenceRegistry,
    catalog: ZoneCatalog,
}

impl SceneContext {
    pub fn new(registry: ReferenceRegistry, catalog: ZoneCatalog) -> Self {
        Self { registry, catalog }
    }

    pub fn reference(&self, camera: u32) -> Result<&Mat> {
        self.registry.reference(camera)
    }

    pub fn zones(&self, camera: u32) -> Result<&[Polygon]> {
        self.catalog.zones(camera)
    }
}
