//! Extractor pipeline driving slot grid inference end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use slot_grid::{ExtractorParams, SlotGridExtractor};
//! use slot_grid::image::ImageU8;
//!
//! # fn example(gray: ImageU8) {
//! let extractor = SlotGridExtractor::new(ExtractorParams::default());
//! match extractor.process(gray) {
//!     Ok(grid) => println!("{}x{}", grid.slot_count, grid.row_count()),
//!     Err(err) => eprintln!("no grid: {err}"),
//! }
//! # }
//! ```
use super::params::ExtractorParams;
use crate::consensus::GridConsensusResolver;
use crate::detect::{
    detect_highlight_threshold, detect_stepped, ComponentRegionDetector, RegionDetector,
};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    ExtractionReport, ExtractionTrace, InputDescriptor, StripDiagnostics, ThresholdSource,
    ThresholdStage, TimingBreakdown,
};
use crate::error::GridError;
use crate::image::gray::to_gray_image;
use crate::image::ImageU8;
use crate::rects::SlotRectBuilder;
use crate::strip::{consolidate, ButtonStrip};
use crate::types::SlotGridResult;
use ::image::GrayImage;
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

/// Slot grid extractor: threshold selection, region detection, strip
/// consolidation and analysis, consensus, rectangle building and the
/// optional container trim.
pub struct SlotGridExtractor<D = ComponentRegionDetector> {
    params: ExtractorParams,
    detector: D,
}

impl SlotGridExtractor<ComponentRegionDetector> {
    /// Create an extractor with the default connected-component detector.
    pub fn new(params: ExtractorParams) -> Self {
        let detector = ComponentRegionDetector::new(params.detection.clone());
        Self { params, detector }
    }
}

impl<D: RegionDetector> SlotGridExtractor<D> {
    /// Create an extractor around a custom region detector.
    pub fn with_detector(params: ExtractorParams, detector: D) -> Self {
        Self { params, detector }
    }

    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    /// Run the extractor on a grayscale photograph, returning the compact result.
    pub fn process(&self, gray: ImageU8) -> Result<SlotGridResult, GridError> {
        self.process_with_diagnostics(gray, None)
            .map(|report| report.result)
    }

    /// Run the extractor and return the result together with a detailed trace.
    ///
    /// `values` is the HSV value channel used to estimate the highlight
    /// threshold; the grayscale photograph is used when it is absent. It is
    /// ignored when the parameters carry an explicit threshold.
    pub fn process_with_diagnostics(
        &self,
        gray: ImageU8,
        values: Option<&GrayImage>,
    ) -> Result<ExtractionReport, GridError> {
        let (width, height) = (gray.w, gray.h);
        debug!("SlotGridExtractor::process start w={} h={}", width, height);
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let threshold = timings.measure("threshold", || self.initial_threshold(&gray, values));
        let (threshold_stage, regions) = timings.measure("regions", || {
            let regions = self.detector.detect_regions(&gray, threshold.0);
            if regions.len() >= 2 {
                return (
                    ThresholdStage {
                        source: threshold.1,
                        initial: threshold.0,
                        used: threshold.0,
                        tried: Vec::new(),
                    },
                    regions,
                );
            }
            debug!(
                "SlotGridExtractor::process {} region(s) at threshold {}, stepping",
                regions.len(),
                threshold.0
            );
            let stepped =
                detect_stepped(&self.detector, &gray, threshold.0, &self.params.detection);
            (
                ThresholdStage {
                    source: ThresholdSource::Stepped,
                    initial: threshold.0,
                    used: stepped.threshold,
                    tried: stepped.tried,
                },
                stepped.regions,
            )
        });
        if regions.len() < 2 {
            return Err(GridError::InsufficientRegions {
                found: regions.len(),
            });
        }
        debug!(
            "SlotGridExtractor::process regions={} threshold={} ({:?})",
            regions.len(),
            threshold_stage.used,
            threshold_stage.source
        );

        let mut strips = timings.measure("consolidate", || {
            consolidate(&regions, &self.params.consolidation, threshold_stage.used)
        });

        timings.measure("separators", || analyze_strips(&mut strips, &self.params));
        let strip_diagnostics: Vec<StripDiagnostics> =
            strips.iter().map(StripDiagnostics::from_strip).collect();
        for (i, s) in strip_diagnostics.iter().enumerate() {
            debug!(
                "SlotGridExtractor::process strip[{}] region={:?} runs={} periodicity={:.3} separators={}",
                i,
                s.region,
                s.run_count,
                s.periodicity,
                s.separators.len()
            );
        }

        let resolver = GridConsensusResolver::new(self.params.consensus.clone());
        let consensus = timings.measure("consensus", || resolver.resolve(&strips, width as i32))?;

        let builder = SlotRectBuilder::new(self.params.rects.clone());
        let mut rows = timings.measure("rects", || {
            builder.build(&strips, &consensus, gray.bounds())
        });
        if self.params.rects.trim_to_container {
            timings.measure("trim", || builder.trim_to_container(&mut rows, &gray));
        }

        timings.total_ms = elapsed_ms(total_start);
        let result = SlotGridResult {
            slot_count: consensus.slot_count,
            mean_slot_width: consensus.mean_slot_width,
            column_edges: consensus.column_edges.clone(),
            rows,
            detection_threshold: threshold_stage.used,
            latency_ms: timings.total_ms,
        };
        debug!(
            "SlotGridExtractor::process done slots={} rows={} code={} total_ms={:.3}",
            result.slot_count,
            result.row_count(),
            result.configuration_code(),
            timings.total_ms
        );

        Ok(ExtractionReport {
            result,
            trace: ExtractionTrace {
                input: InputDescriptor { width, height },
                threshold: threshold_stage,
                region_count: regions.len(),
                strips: strip_diagnostics,
                consensus,
                timings,
            },
        })
    }

    fn initial_threshold(
        &self,
        gray: &ImageU8,
        values: Option<&GrayImage>,
    ) -> (u8, ThresholdSource) {
        if let Some(t) = self.params.detection_threshold {
            return (t, ThresholdSource::Explicit);
        }
        let estimate = match values {
            Some(v) => detect_highlight_threshold(v),
            None => detect_highlight_threshold(&to_gray_image(gray)),
        };
        (
            estimate.saturating_sub(self.params.detection.threshold_bias),
            ThresholdSource::Detected,
        )
    }
}

/// Strips are independent; all of them are analysed before consensus.
fn analyze_strips(strips: &mut [ButtonStrip], params: &ExtractorParams) {
    strips
        .par_iter_mut()
        .for_each(|strip| strip.analyze(&params.separators));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::RawRegion;
    use crate::types::Rect;
    use std::cell::Cell;

    struct Fixed {
        regions: Vec<RawRegion>,
        calls: Cell<usize>,
    }

    impl RegionDetector for Fixed {
        fn detect_regions(&self, _image: &ImageU8, _threshold: u8) -> Vec<RawRegion> {
            self.calls.set(self.calls.get() + 1);
            self.regions.clone()
        }
    }

    fn blank(w: usize, h: usize) -> Vec<u8> {
        vec![0u8; w * h]
    }

    #[test]
    fn too_few_regions_after_stepping_fail() {
        let data = blank(64, 64);
        let gray = ImageU8 {
            w: 64,
            h: 64,
            stride: 64,
            data: &data,
        };
        let params = ExtractorParams {
            detection_threshold: Some(230),
            ..Default::default()
        };
        let detector = Fixed {
            regions: vec![RawRegion::filled(Rect::new(0, 10, 60, 5))],
            calls: Cell::new(0),
        };
        let extractor = SlotGridExtractor::with_detector(params, detector);
        let err = extractor.process(gray).unwrap_err();
        assert_eq!(err, GridError::InsufficientRegions { found: 1 });
        // initial attempt plus 229, 224, ..., 194
        assert_eq!(extractor.detector.calls.get(), 1 + 8);
    }

    #[test]
    fn strips_without_signal_fail_consensus() {
        let data = blank(200, 200);
        let gray = ImageU8 {
            w: 200,
            h: 200,
            stride: 200,
            data: &data,
        };
        let params = ExtractorParams {
            detection_threshold: Some(200),
            ..Default::default()
        };
        let detector = Fixed {
            regions: vec![
                RawRegion::filled(Rect::new(10, 50, 180, 10)),
                RawRegion::filled(Rect::new(10, 150, 180, 10)),
            ],
            calls: Cell::new(0),
        };
        let extractor = SlotGridExtractor::with_detector(params, detector);
        let err = extractor.process(gray).unwrap_err();
        assert_eq!(err, GridError::NoReliableSignal { strips: 2 });
        assert_eq!(extractor.detector.calls.get(), 1);
    }

    #[test]
    fn parallel_analysis_matches_sequential() {
        let mut mask = GrayImage::new(300, 20);
        for x in (0..300).filter(|x| (x / 30) % 2 == 1) {
            for y in 0..20 {
                mask.put_pixel(x, y, ::image::Luma([255]));
            }
        }
        let params = ExtractorParams::default();
        let mut strips = vec![ButtonStrip::new(Rect::new(0, 0, 300, 20), mask); 4];
        let mut sequential = strips[0].clone();
        sequential.analyze(&params.separators);
        analyze_strips(&mut strips, &params);
        assert!(strips.iter().all(|s| s.separators == sequential.separators));
    }
}
