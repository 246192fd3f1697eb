//! Highlight threshold selection.
//!
//! The highlight on the button strips is the purest white in the photograph.
//! Its brightness peak sits at the top of the value histogram; the first
//! local minimum below that peak separates it from the rest of the machine.

use super::RegionDetector;
use crate::extractor::params::DetectionOptions;
use crate::image::ImageU8;
use crate::strip::RawRegion;
use image::GrayImage;
use imageproc::stats::histogram;
use log::debug;

/// Highest histogram bin inspected; the few brightest bins are mostly clipping.
const SCAN_START: usize = 252;
/// Offset below the detected minimum.
const MINIMUM_OFFSET: u8 = 10;

/// Estimate a highlight threshold from the value channel of a photograph.
///
/// Scans the histogram downward from bin 252 for the first bin whose count
/// exceeds the count of the bin above it, and returns that bin minus 10.
pub fn detect_highlight_threshold(values: &GrayImage) -> u8 {
    let hist = &histogram(values).channels[0];
    let mut last = hist[SCAN_START];
    let mut found = SCAN_START;
    for i in (0..=SCAN_START).rev() {
        if hist[i] > last {
            found = i;
            break;
        }
        last = hist[i];
    }
    let threshold = (found as u8).saturating_sub(MINIMUM_OFFSET);
    debug!("detect_highlight_threshold minimum_bin={} threshold={}", found, threshold);
    threshold
}

/// Outcome of the stepped threshold search.
#[derive(Clone, Debug, Default)]
pub struct SteppedDetection {
    /// Threshold the returned regions were detected with.
    pub threshold: u8,
    pub regions: Vec<RawRegion>,
    /// Every threshold handed to the detector, in order.
    pub tried: Vec<u8>,
}

/// Step the threshold down from `initial - 1` to `step_floor` until at least
/// two regions appear, then lower it by `threshold_bias` and detect once more.
///
/// When no step succeeds the result holds the regions of the last attempt.
pub fn detect_stepped<D: RegionDetector + ?Sized>(
    detector: &D,
    image: &ImageU8,
    initial: u8,
    opts: &DetectionOptions,
) -> SteppedDetection {
    let mut out = SteppedDetection {
        threshold: initial,
        ..Default::default()
    };
    let step = opts.step.max(1) as i32;
    let mut t = initial as i32 - 1;
    while t >= opts.step_floor as i32 {
        let threshold = t as u8;
        out.tried.push(threshold);
        let regions = detector.detect_regions(image, threshold);
        if regions.len() >= 2 {
            let biased = threshold.saturating_sub(opts.threshold_bias);
            out.tried.push(biased);
            out.regions = detector.detect_regions(image, biased);
            out.threshold = biased;
            debug!(
                "detect_stepped found {} region(s) at {} (biased from {})",
                out.regions.len(),
                biased,
                threshold
            );
            return out;
        }
        out.threshold = threshold;
        out.regions = regions;
        t -= step;
    }
    debug!("detect_stepped gave up after {:?}", out.tried);
    out
}
