mod annotate;
mod diff;
mod exclusion;
mod morphology;
mod regions;

pub use annotate::annotate;
pub use diff::diff;
pub use exclusion::apply_exclusions;
pub use morphology::close;
pub use regions::{extract_regions, Region};
