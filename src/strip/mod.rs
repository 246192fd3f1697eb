//! Button strips: horizontal bands of selection buttons found in the photo.
//!
//! Modules
//! - [`consolidate`] – merge candidate regions into strips and assign the
//!   slot height of each row.
//! - [`profile`] – column-average profile, midrange binarization, smear.
//! - [`separators`] – run-length based slot separator extraction.

pub mod consolidate;
pub mod profile;
pub mod separators;


pub use consolidate::{assign_slot_heights, build_strip, consolidate, RawRegion};
pub use separators::{extract_separators, select_separators, SeparatorAnalysis};

use crate::extractor::params::SeparatorOptions;
use crate::runlength;
use crate::types::Rect;
use image::GrayImage;

/// A detected horizontal band of selection buttons.
///
/// `mask` covers `region` exactly and belongs to this strip alone. The
/// signal fields are filled by [`ButtonStrip::analyze`]; `slots_height` and
/// `detection_threshold` by the consolidation pass.
#[derive(Clone, Debug)]
pub struct ButtonStrip {
    pub region: Rect,
    pub mask: GrayImage,
    pub profile: Vec<f32>,
    pub separator_threshold: f32,
    pub runs: Vec<usize>,
    pub starts_high: bool,
    /// Slot boundaries as x-offsets relative to `region.x`.
    pub separators: Vec<i32>,
    pub denoise_passes: usize,
    pub slots_height: i32,
    pub detection_threshold: u8,
}

impl ButtonStrip {
    pub fn new(region: Rect, mask: GrayImage) -> Self {
        Self {
            region,
            mask,
            profile: Vec::new(),
            separator_threshold: 0.0,
            runs: Vec::new(),
            starts_high: false,
            separators: Vec::new(),
            denoise_passes: 0,
            slots_height: 0,
            detection_threshold: 0,
        }
    }

    /// Derive profile, runs and separators from the mask, in that order.
    pub fn analyze(&mut self, opts: &SeparatorOptions) {
        let SeparatorAnalysis {
            profile,
            threshold,
            runs,
            starts_high,
            denoise_passes,
            separators,
            ..
        } = extract_separators(&self.mask, opts);
        self.profile = profile;
        self.separator_threshold = threshold;
        self.runs = runs;
        self.starts_high = starts_high;
        self.denoise_passes = denoise_passes;
        self.separators = separators;
    }

    pub fn periodicity(&self) -> f32 {
        runlength::periodicity(&self.runs)
    }

    /// Separator spans (distance between adjacent separators).
    pub fn spans(&self) -> impl Iterator<Item = i32> + '_ {
        self.separators.windows(2).map(|w| w[1] - w[0])
    }
}
