//! Machine-wide slot grid consensus.
//!
//! Every strip yields a noisy estimate of the slot separators. The resolver
//! keeps the strips with a periodic signal, picks the widest of them as the
//! reference, and votes a single slot width from all plausible separator
//! spans. Rows are then forced onto the reference's columns.
//!
//! The resolver holds no state across photographs and is deterministic.

use crate::error::GridError;
use crate::extractor::params::ConsensusOptions;
use crate::strip::ButtonStrip;
use crate::types::Rect;
use log::debug;
use serde::Serialize;

/// How one strip compares to the reference strip.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripAgreement {
    pub periodicity: f32,
    pub reliable: bool,
    pub width_variance: f32,
    pub left_variance: f32,
    pub right_variance: f32,
    pub checks_passed: u8,
    pub accepted: bool,
    pub extremely_aligned: bool,
}

/// The consolidated column layout of one photograph.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConsensus {
    /// Index of the reference strip in the analysed strip list.
    pub reference: usize,
    pub reference_region: Rect,
    pub slot_count: usize,
    pub mean_slot_width: f32,
    /// `slot_count + 1` offsets relative to the reference's left edge.
    pub standard_separators: Vec<i32>,
    /// Absolute x positions of the column boundaries.
    pub column_edges: Vec<i32>,
    /// Indices of the strips kept as output rows, top to bottom.
    pub accepted: Vec<usize>,
    pub agreements: Vec<StripAgreement>,
}

/// Reconciles per-strip separators into one column layout.
#[derive(Clone, Debug, Default)]
pub struct GridConsensusResolver {
    pub opts: ConsensusOptions,
}

impl GridConsensusResolver {
    pub fn new(opts: ConsensusOptions) -> Self {
        Self { opts }
    }

    pub fn resolve(
        &self,
        strips: &[ButtonStrip],
        photo_width: i32,
    ) -> Result<GridConsensus, GridError> {
        let opts = &self.opts;
        let scores: Vec<f32> = strips.iter().map(ButtonStrip::periodicity).collect();
        let reliable: Vec<bool> = scores
            .iter()
            .map(|&s| s < opts.reliability_threshold)
            .collect();

        let mut reference: Option<usize> = None;
        for (i, strip) in strips.iter().enumerate() {
            if !reliable[i] {
                continue;
            }
            match reference {
                Some(r) if strips[r].region.width >= strip.region.width => {}
                _ => reference = Some(i),
            }
        }
        let Some(reference) = reference else {
            debug!(
                "GridConsensusResolver::resolve no reliable strip among {} (scores {:?})",
                strips.len(),
                scores
            );
            return Err(GridError::NoReliableSignal {
                strips: strips.len(),
            });
        };
        let ref_region = strips[reference].region;

        let photo_width = photo_width.max(1) as f32;
        let mut agreements = Vec::with_capacity(strips.len());
        let mut accepted = Vec::new();
        for (i, strip) in strips.iter().enumerate() {
            let region = strip.region;
            let width_variance = (1.0 - region.width as f32 / ref_region.width as f32).abs();
            let left_variance = (region.x - ref_region.x).abs() as f32 / photo_width;
            let right_variance = (region.right() - ref_region.right()).abs() as f32 / photo_width;
            let checks_passed = [
                width_variance < opts.width_tolerance,
                left_variance < opts.position_tolerance,
                right_variance < opts.position_tolerance,
            ]
            .into_iter()
            .filter(|&ok| ok)
            .count() as u8;
            let is_reference = i == reference;
            let agreement = StripAgreement {
                periodicity: scores[i],
                reliable: reliable[i],
                width_variance,
                left_variance,
                right_variance,
                checks_passed,
                accepted: is_reference || checks_passed >= 2,
                extremely_aligned: !is_reference
                    && left_variance < opts.extreme_alignment
                    && right_variance < opts.extreme_alignment,
            };
            if agreement.accepted {
                accepted.push(i);
            }
            agreements.push(agreement);
        }

        let (total, count) = strips
            .iter()
            .zip(&reliable)
            .filter(|(_, &ok)| ok)
            .fold((0i64, 0usize), |(total, count), (strip, _)| {
                let width = strip.region.width as f32;
                let lo = width / opts.min_span_divisor;
                let hi = width / opts.max_span_divisor;
                strip
                    .spans()
                    .filter(|&span| span as f32 > lo && (span as f32) < hi)
                    .fold((total, count), |(t, c), span| (t + span as i64, c + 1))
            });
        if count == 0 {
            debug!("GridConsensusResolver::resolve no separator span in range");
            return Err(GridError::NoGoodSlots);
        }

        let mean_slot_width = total as f32 / count as f32;
        let slot_count = ((ref_region.width as f32 / mean_slot_width).round() as usize).max(1);
        let standard_separators = standard_separators(ref_region.width, slot_count);

        // offsets are adjusted relative to the reference strip, then anchored at its left edge
        let offsets = if opts.perspective {
            perspective_adjust(&standard_separators, photo_width / 2.0, opts.perspective_factor)
        } else {
            standard_separators.clone()
        };
        let column_edges: Vec<i32> = offsets.iter().map(|&s| ref_region.x + s).collect();

        debug!(
            "GridConsensusResolver::resolve reference={} width={} spans={} mean={:.2} slots={} accepted={}/{}",
            reference,
            ref_region.width,
            count,
            mean_slot_width,
            slot_count,
            accepted.len(),
            strips.len()
        );

        Ok(GridConsensus {
            reference,
            reference_region: ref_region,
            slot_count,
            mean_slot_width,
            standard_separators,
            column_edges,
            accepted,
            agreements,
        })
    }
}

/// `slot_count + 1` evenly spaced offsets from 0 to `width`.
pub fn standard_separators(width: i32, slot_count: usize) -> Vec<i32> {
    let n = slot_count.max(1) as f64;
    (0..=slot_count.max(1))
        .map(|k| (k as f64 * width as f64 / n).round() as i32)
        .collect()
}

/// Pull positions toward `midpoint`: `s' = round(M − (M − s)·factor)`.
pub fn perspective_adjust(values: &[i32], midpoint: f32, factor: f32) -> Vec<i32> {
    values
        .iter()
        .map(|&s| (midpoint - (midpoint - s as f32) * factor).round() as i32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    // interior runs with small jitter: periodicity 3.0
    const PERIODIC_RUNS: [usize; 8] = [10, 80, 18, 84, 18, 80, 22, 12];

    fn strip(region: Rect, separators: Vec<i32>, runs: &[usize]) -> ButtonStrip {
        let mut s = ButtonStrip::new(region, GrayImage::new(1, 1));
        s.separators = separators;
        s.runs = runs.to_vec();
        s
    }

    fn even_separators(width: i32, step: i32) -> Vec<i32> {
        (0..=width / step).map(|k| k * step).collect()
    }

    fn resolver() -> GridConsensusResolver {
        GridConsensusResolver::new(ConsensusOptions {
            perspective: false,
            ..Default::default()
        })
    }

    #[test]
    fn similar_strip_is_accepted() {
        let strips = vec![
            strip(Rect::new(0, 100, 500, 30), even_separators(500, 90), &PERIODIC_RUNS),
            strip(Rect::new(10, 300, 520, 30), even_separators(520, 80), &PERIODIC_RUNS),
        ];
        let consensus = resolver().resolve(&strips, 500).unwrap();
        assert_eq!(consensus.reference, 1);
        assert_eq!(consensus.accepted, vec![0, 1]);
        let other = &consensus.agreements[0];
        assert!((other.width_variance - 20.0 / 520.0).abs() < 1e-6);
        assert!((other.left_variance - 0.02).abs() < 1e-6);
        assert!((other.right_variance - 0.06).abs() < 1e-6);
        assert_eq!(other.checks_passed, 3);
        assert!(!other.extremely_aligned);
    }

    #[test]
    fn misaligned_strip_is_rejected() {
        let strips = vec![
            strip(Rect::new(0, 100, 600, 30), even_separators(600, 100), &PERIODIC_RUNS),
            strip(Rect::new(300, 300, 250, 30), vec![], &[250]),
        ];
        let consensus = resolver().resolve(&strips, 1000).unwrap();
        assert_eq!(consensus.accepted, vec![0]);
        assert!(!consensus.agreements[1].accepted);
        assert!(!consensus.agreements[1].reliable);
    }

    #[test]
    fn no_reliable_strips_fail() {
        let strips = vec![
            strip(Rect::new(0, 100, 600, 30), even_separators(600, 100), &[600]),
            strip(
                Rect::new(0, 300, 600, 30),
                even_separators(600, 100),
                &[10, 80, 20, 80, 20, 80, 10],
            ),
        ];
        let err = resolver().resolve(&strips, 1000).unwrap_err();
        assert_eq!(err, GridError::NoReliableSignal { strips: 2 });
        assert_eq!(err.exit_code(), -2);
        assert!(matches!(
            resolver().resolve(&[], 1000),
            Err(GridError::NoReliableSignal { strips: 0 })
        ));
    }

    #[test]
    fn implausible_spans_fail() {
        // 600 / 5 = 120 is the upper bound, 200 px spans never count
        let strips = vec![strip(
            Rect::new(0, 100, 600, 30),
            even_separators(600, 200),
            &PERIODIC_RUNS,
        )];
        assert_eq!(resolver().resolve(&strips, 1000).unwrap_err(), GridError::NoGoodSlots);
    }

    #[test]
    fn slot_count_and_standard_separators_follow_mean_width() {
        let strips = vec![strip(
            Rect::new(50, 100, 600, 30),
            even_separators(600, 100),
            &PERIODIC_RUNS,
        )];
        let consensus = resolver().resolve(&strips, 1000).unwrap();
        assert_eq!(consensus.slot_count, 6);
        assert!((consensus.mean_slot_width - 100.0).abs() < 1e-6);
        assert_eq!(consensus.standard_separators, vec![0, 100, 200, 300, 400, 500, 600]);
        assert_eq!(consensus.column_edges, vec![50, 150, 250, 350, 450, 550, 650]);
    }

    #[test]
    fn standard_separators_round_uneven_division() {
        assert_eq!(standard_separators(100, 3), vec![0, 33, 67, 100]);
        let seps = standard_separators(797, 8);
        assert_eq!(seps.len(), 9);
        assert_eq!((seps[0], seps[8]), (0, 797));
        assert!(seps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn perspective_pulls_toward_midpoint() {
        assert_eq!(perspective_adjust(&[100], 960.0, 0.95), vec![143]);
        assert_eq!(perspective_adjust(&[960, 1820], 960.0, 0.95), vec![960, 1777]);
    }

    #[test]
    fn perspective_adjusts_offsets_before_anchoring() {
        let strips = vec![strip(
            Rect::new(200, 100, 600, 30),
            even_separators(600, 100),
            &PERIODIC_RUNS,
        )];
        let consensus = GridConsensusResolver::default()
            .resolve(&strips, 1920)
            .unwrap();
        assert_eq!(consensus.slot_count, 6);
        // 0 -> 48 around M = 960, then shifted by the reference's x = 200
        assert_eq!(
            consensus.column_edges,
            vec![248, 343, 438, 533, 628, 723, 818]
        );
        assert_eq!(consensus.standard_separators[0], 0);
    }

    #[test]
    fn widest_reliable_strip_is_reference_and_ties_keep_first() {
        let strips = vec![
            strip(Rect::new(0, 100, 600, 30), even_separators(600, 100), &PERIODIC_RUNS),
            strip(Rect::new(0, 300, 900, 30), even_separators(900, 100), &[900]),
            strip(Rect::new(0, 500, 600, 30), even_separators(600, 100), &PERIODIC_RUNS),
        ];
        let consensus = resolver().resolve(&strips, 1000).unwrap();
        assert_eq!(consensus.reference, 0);
        assert!(consensus.agreements[2].extremely_aligned);
        assert!(!consensus.agreements[0].extremely_aligned);
    }

    #[test]
    fn resolution_is_deterministic() {
        let strips = vec![
            strip(
                Rect::new(20, 100, 780, 30),
                vec![0, 95, 198, 301, 390, 497, 600, 690, 780],
                &PERIODIC_RUNS,
            ),
            strip(
                Rect::new(25, 300, 770, 30),
                vec![48, 150, 240, 352, 447, 553, 640, 770],
                &PERIODIC_RUNS,
            ),
        ];
        let r = GridConsensusResolver::new(ConsensusOptions::default());
        let a = r.resolve(&strips, 900).unwrap();
        let b = r.resolve(&strips, 900).unwrap();
        assert_eq!(a.slot_count, b.slot_count);
        assert_eq!(a.column_edges, b.column_edges);
        assert_eq!(a.accepted, b.accepted);
        assert_eq!(a.mean_slot_width, b.mean_slot_width);
    }
}
