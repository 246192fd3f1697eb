//! Diagnostics data model returned alongside the extraction result.
//!
//! [`ExtractionReport`] bundles the compact [`SlotGridResult`] with an
//! [`ExtractionTrace`] describing every stage the extractor executed: how the
//! highlight threshold was chosen, which strips were found and what each one
//! measured, the consensus that was reached and how long every stage took.

pub mod timing;

pub use timing::{StageTiming, TimingBreakdown};

use crate::consensus::GridConsensus;
use crate::strip::ButtonStrip;
use crate::types::{Rect, SlotGridResult};
use serde::Serialize;

/// Result produced by [`SlotGridExtractor::process_with_diagnostics`](crate::SlotGridExtractor).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub result: SlotGridResult,
    pub trace: ExtractionTrace,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionTrace {
    pub input: InputDescriptor,
    pub threshold: ThresholdStage,
    /// Candidate regions handed to consolidation.
    pub region_count: usize,
    pub strips: Vec<StripDiagnostics>,
    pub consensus: GridConsensus,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdSource {
    Explicit,
    Detected,
    Stepped,
}

/// How the highlight threshold used for region detection was chosen.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdStage {
    pub source: ThresholdSource,
    /// Explicit value, or the histogram estimate minus the bias.
    pub initial: u8,
    /// Threshold the strips were finally detected with.
    pub used: u8,
    /// Thresholds tried by the stepped search, if it ran.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tried: Vec<u8>,
}

/// Per-strip signal measurements.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripDiagnostics {
    pub region: Rect,
    pub profile_threshold: f32,
    pub starts_high: bool,
    pub run_count: usize,
    pub denoise_passes: usize,
    pub periodicity: f32,
    pub separators: Vec<i32>,
    pub slots_height: i32,
}

impl StripDiagnostics {
    pub fn from_strip(strip: &ButtonStrip) -> Self {
        Self {
            region: strip.region,
            profile_threshold: strip.separator_threshold,
            starts_high: strip.starts_high,
            run_count: strip.runs.len(),
            denoise_passes: strip.denoise_passes,
            periodicity: strip.periodicity(),
            separators: strip.separators.clone(),
            slots_height: strip.slots_height,
        }
    }
}

impl ExtractionReport {
    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let r = &self.result;
        format!(
            "slots={} rows={} slot_width={:.1} threshold={} ({:?}) strips={} latency={:.2}ms",
            r.slot_count,
            r.row_count(),
            r.mean_slot_width,
            self.trace.threshold.used,
            self.trace.threshold.source,
            self.trace.strips.len(),
            r.latency_ms
        )
    }
}
