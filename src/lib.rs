#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod image;
pub mod types;

// Stage modules – public so tools can run stages on their own.
pub mod consensus;
pub mod detect;
pub mod rects;
pub mod runlength;
pub mod strip;
pub mod trim;

// --- High-level re-exports -------------------------------------------------

// Main entry points: extractor + results.
pub use crate::error::GridError;
pub use crate::extractor::{ExtractorParams, SlotGridExtractor};
pub use crate::types::{Rect, SlotGridResult};

// High-level diagnostics returned by the extractor.
pub use crate::diagnostics::{ExtractionReport, ExtractionTrace};

// Stage building blocks that are useful on their own.
pub use crate::consensus::{GridConsensus, GridConsensusResolver};
pub use crate::detect::{ComponentRegionDetector, RegionDetector};
pub use crate::rects::{SlotRectBuilder, SlotRow};
pub use crate::strip::{ButtonStrip, RawRegion};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use slot_grid::prelude::*;
///
/// # fn main() {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let extractor = SlotGridExtractor::new(ExtractorParams {
///     detection_threshold: Some(220),
///     ..Default::default()
/// });
///
/// match extractor.process(img) {
///     Ok(grid) => println!("code={}", grid.configuration_code()),
///     Err(err) => println!("failed ({}): {err}", err.exit_code()),
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{ExtractorParams, GridError, SlotGridExtractor, SlotGridResult};
}
