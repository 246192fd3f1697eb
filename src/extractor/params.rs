//! Parameter types configuring the extraction stages.
//!
//! This module groups knobs for highlight detection, strip consolidation,
//! per-strip separator extraction, cross-strip consensus and slot rectangle
//! building.
//!
//! Defaults were tuned on photographs of Japanese soft-drink machines taken
//! at roughly 1–4 megapixels. Absolute pixel values (the single-strip slot
//! height, the minimum slot width) are the first knobs to revisit for other
//! resolutions.

use serde::{Deserialize, Serialize};

/// Extractor-wide parameters controlling the multi-stage pipeline.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorParams {
    /// Explicit highlight threshold. `None` detects it from the histogram.
    pub detection_threshold: Option<u8>,
    pub detection: DetectionOptions,
    pub consolidation: ConsolidationOptions,
    pub separators: SeparatorOptions,
    pub consensus: ConsensusOptions,
    pub rects: RectOptions,
}

/// Candidate region detection and the stepped threshold retry.
///
/// - `min_pixels`: smallest connected component kept as a candidate.
/// - `min_aspect`: candidates must be at least this many times wider than tall.
/// - `width_fraction`: candidates must be wider than `image_width / width_fraction`.
/// - `top_fraction`: candidates must start below `image_height / top_fraction`.
/// - `threshold_bias`: subtracted from a detected or stepped threshold.
/// - `step` / `step_floor`: stepping schedule when too few regions are found.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionOptions {
    pub min_pixels: usize,
    pub min_aspect: u32,
    pub width_fraction: u32,
    pub top_fraction: u32,
    pub threshold_bias: u8,
    pub step: u8,
    pub step_floor: u8,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_pixels: 200,
            min_aspect: 3,
            width_fraction: 10,
            top_fraction: 15,
            threshold_bias: 20,
            step: 5,
            step_floor: 192,
        }
    }
}

/// Merging candidate regions into button strips.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsolidationOptions {
    /// Fraction of the previous region's width used as the merge margin.
    pub margin_fraction: f32,
    /// Strips taller than `max_aspect × width` are discarded.
    pub max_aspect: f32,
    /// Slot height assigned when only one strip is found.
    pub single_strip_slots_height: i32,
    /// The top row has no strip above it; its height is the second row's times this.
    pub first_row_factor: f32,
    /// Second-row height ratio over the third row that marks an inflated estimate.
    pub inflated_row_ratio: f32,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self {
            margin_fraction: 0.1,
            max_aspect: 0.5,
            single_strip_slots_height: 400,
            first_row_factor: 1.5,
            inflated_row_ratio: 1.4,
        }
    }
}

/// Per-strip separator extraction.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SeparatorOptions {
    /// Width in pixels of the horizontal smear closing gaps in the binary profile.
    pub smear_window: usize,
    /// Maximum denoising passes.
    pub denoise_iterations: usize,
    /// Denoising stops once periodicity falls below this.
    pub denoise_target: f32,
}

impl Default for SeparatorOptions {
    fn default() -> Self {
        Self {
            smear_window: 20,
            denoise_iterations: 2,
            denoise_target: 5.0,
        }
    }
}

/// Cross-strip consensus.
///
/// - `reliability_threshold`: strips with periodicity below this vote.
/// - `width_tolerance` / `position_tolerance`: agreement checks against the
///   reference strip (relative width, offsets relative to photo width).
/// - `extreme_alignment`: position variance under which a strip is flagged
///   as extremely aligned in diagnostics.
/// - `min_span_divisor` / `max_span_divisor`: plausible separator spans lie
///   strictly between `width / min_span_divisor` and `width / max_span_divisor`.
/// - `perspective`: pull column edges toward the image centre.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsensusOptions {
    pub reliability_threshold: f32,
    pub width_tolerance: f32,
    pub position_tolerance: f32,
    pub extreme_alignment: f32,
    pub min_span_divisor: f32,
    pub max_span_divisor: f32,
    pub perspective: bool,
    pub perspective_factor: f32,
}

impl Default for ConsensusOptions {
    fn default() -> Self {
        Self {
            reliability_threshold: 10.0,
            width_tolerance: 0.05,
            position_tolerance: 0.08,
            extreme_alignment: 0.008,
            min_span_divisor: 15.0,
            max_span_divisor: 5.0,
            perspective: true,
            perspective_factor: 0.95,
        }
    }
}

/// Slot rectangle construction, validity limits and container trimming.
///
/// - `trim_to_container`: cut the corner-free background band off the top
///   of every drink rectangle.
/// - `harris_k`: Harris detector sensitivity.
/// - `corner_threshold_ratio`: corner rows respond above this fraction of the
///   slot's strongest response.
/// - `min_trimmed_aspect`: a trim is undone when the remaining height would
///   fall below this multiple of the slot width.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RectOptions {
    /// Width-to-height ratio of the price label carved from each slot.
    pub label_aspect: f32,
    pub min_width: i32,
    /// Rectangles taller than `max_height_ratio × width` are dropped.
    pub max_height_ratio: i32,
    /// Rectangles wider than `max_width_ratio × height` are dropped.
    pub max_width_ratio: i32,
    pub trim_to_container: bool,
    pub harris_k: f32,
    pub corner_threshold_ratio: f32,
    pub min_trimmed_aspect: f32,
}

impl Default for RectOptions {
    fn default() -> Self {
        Self {
            label_aspect: 2.8,
            min_width: 20,
            max_height_ratio: 10,
            max_width_ratio: 2,
            trim_to_container: true,
            harris_k: 0.04,
            corner_threshold_ratio: 0.01,
            min_trimmed_aspect: 1.3,
        }
    }
}
