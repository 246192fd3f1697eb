//! Slot separator extraction for a single strip.
//!
//! The binarized strip profile alternates between button and divider
//! regions. After smearing and (if needed) denoising, the midpoints of every
//! other run mark the boundaries between adjacent drink slots.

use super::profile::{binarize, profile, smear};
use crate::extractor::params::SeparatorOptions;
use crate::image::ImageView;
use crate::runlength::{self, periodicity};
use log::debug;

/// Everything derived from one strip's pixels.
#[derive(Clone, Debug, Default)]
pub struct SeparatorAnalysis {
    pub profile: Vec<f32>,
    pub threshold: f32,
    pub runs: Vec<usize>,
    pub starts_high: bool,
    pub periodicity: f32,
    pub denoise_passes: usize,
    pub separators: Vec<i32>,
}

/// Profile the strip pixels and derive its separators.
///
/// Never fails: a degenerate strip yields an analysis with no separators,
/// which keeps it out of the slot-width vote.
pub fn extract_separators<I: ImageView<Pixel = u8>>(
    pixels: &I,
    opts: &SeparatorOptions,
) -> SeparatorAnalysis {
    let profile = profile(pixels);
    let (bools, threshold) = binarize(&profile);
    let bools = smear(&bools, opts.smear_window);
    let starts_high = bools.first().copied().unwrap_or(false);

    let mut runs = match runlength::encode(&bools) {
        Ok(runs) => runs,
        Err(err) => {
            debug!("extract_separators: {err}");
            return SeparatorAnalysis {
                profile,
                threshold,
                periodicity: runlength::PERIODICITY_SENTINEL,
                ..Default::default()
            };
        }
    };

    let mut score = periodicity(&runs);
    let mut denoise_passes = 0;
    while score >= opts.denoise_target && denoise_passes < opts.denoise_iterations {
        runs = runlength::denoise(&runs);
        score = periodicity(&runs);
        denoise_passes += 1;
    }

    let separators = select_separators(&runs, starts_high);
    SeparatorAnalysis {
        profile,
        threshold,
        runs,
        starts_high,
        periodicity: score,
        denoise_passes,
        separators,
    }
}

/// Pick every other run midpoint, starting with the leading `0` when the
/// profile starts high.
///
/// When the walk ends on an unselected mark the final boundary would be
/// lost, so the last selected separator is moved to the total width instead.
pub fn select_separators(runs: &[usize], starts_high: bool) -> Vec<i32> {
    if runs.is_empty() {
        return Vec::new();
    }
    let mids = runlength::midpoints(runs);
    let mut separators = Vec::with_capacity(mids.len() / 2 + 1);
    let mut take = starts_high;
    for &mark in &mids {
        if take {
            separators.push(mark);
        }
        take = !take;
    }
    if take {
        if let (Some(last), Some(&end)) = (separators.last_mut(), mids.last()) {
            *last = end;
        }
    }
    separators
}
