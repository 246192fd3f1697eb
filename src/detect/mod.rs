//! Candidate highlight regions.
//!
//! The white highlight running along each row of selection buttons is the
//! brightest structure in a vending-machine photograph. Thresholding close to
//! the top of the brightness histogram isolates it; connected blobs that are
//! wide, flat and not at the very top of the photograph become candidates for
//! button strips.
//!
//! Modules
//! - [`regions`] – connected-component detector behind [`RegionDetector`].
//! - [`threshold`] – histogram-based threshold estimate and the stepped
//!   retry used when too few candidates are found.

pub mod regions;
pub mod threshold;

pub use regions::ComponentRegionDetector;
pub use threshold::{detect_highlight_threshold, detect_stepped, SteppedDetection};

use crate::image::ImageU8;
use crate::strip::RawRegion;

/// Source of candidate strip regions for a binarization threshold.
///
/// Implementations return regions sorted by ascending `y`.
pub trait RegionDetector {
    fn detect_regions(&self, image: &ImageU8, threshold: u8) -> Vec<RawRegion>;
}
