//! Run-length utilities for binarized strip profiles.
//!
//! A strip profile thresholded into high/low samples becomes a sequence of
//! run lengths. Regularly spaced buttons produce an alternating pattern of
//! near-constant runs, which is what [`periodicity`] measures and what
//! [`denoise`] tries to restore when short spurious runs break it up.

use crate::error::GridError;

/// Periodicity score reported when a run sequence is too short or flat to be
/// judged. Large and positive so it ranks last among candidate strips.
pub const PERIODICITY_SENTINEL: f32 = 255.1234;

/// Run lengths of a boolean sequence. A constant sequence yields one run.
pub fn encode(values: &[bool]) -> Result<Vec<usize>, GridError> {
    let (&first, rest) = values.split_first().ok_or(GridError::EmptyInput)?;
    let mut runs = Vec::new();
    let mut last = first;
    let mut this_run = 1usize;
    for &v in rest {
        if v == last {
            this_run += 1;
        } else {
            runs.push(this_run);
            this_run = 1;
            last = v;
        }
    }
    runs.push(this_run);
    Ok(runs)
}

/// Expand run lengths back into samples, alternating from `starts_high`.
pub fn decode(runs: &[usize], starts_high: bool) -> Vec<bool> {
    let mut out = Vec::with_capacity(runs.iter().sum());
    let mut level = starts_high;
    for &run in runs {
        out.extend(std::iter::repeat(level).take(run));
        level = !level;
    }
    out
}

/// Marks at the midpoint of every run after the first, framed by a leading
/// `0` and the trailing total length. The result has `runs.len() + 1`
/// entries; the lead-in run is represented by the leading `0`.
pub fn midpoints(runs: &[usize]) -> Vec<i32> {
    let mut mids = Vec::with_capacity(runs.len() + 1);
    mids.push(0);
    let Some((&first, rest)) = runs.split_first() else {
        return mids;
    };
    let mut total = first as i32;
    for &run in rest {
        let run = run as i32;
        mids.push(total + run / 2);
        total += run;
    }
    mids.push(total);
    mids
}

/// Mean absolute second difference of the interior runs.
///
/// The first and last runs are lead-in/lead-out and are ignored. A stably
/// periodic signal scores close to 0. Returns [`PERIODICITY_SENTINEL`] when
/// there are fewer than 4 runs, no second differences, or every second
/// difference is 0.
pub fn periodicity(runs: &[usize]) -> f32 {
    if runs.len() < 4 {
        return PERIODICITY_SENTINEL;
    }
    let interior = &runs[1..runs.len() - 1];
    let first_diffs: Vec<i64> = interior
        .windows(2)
        .map(|w| (w[1] as i64 - w[0] as i64).abs())
        .collect();
    let second_diffs: Vec<i64> = first_diffs
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .collect();
    let total: i64 = second_diffs.iter().sum();
    if second_diffs.is_empty() || total == 0 {
        return PERIODICITY_SENTINEL;
    }
    total as f32 / second_diffs.len() as f32
}

/// One denoising pass: fold every interior run at or below the shortest
/// interior run into its two neighbours.
///
/// Merging three alternating runs into one keeps the parity of everything
/// that follows, and the total length is preserved. The run right after a
/// merge is passed through untouched before scanning resumes.
pub fn denoise(runs: &[usize]) -> Vec<usize> {
    if runs.len() < 3 {
        return runs.to_vec();
    }
    let last = runs.len() - 1;
    let min_interior = runs[1..last].iter().copied().min().unwrap_or(0);

    let mut out = Vec::with_capacity(runs.len());
    out.push(runs[0]);
    let mut left_is_merged = false;
    let mut i = 1;
    while i <= last {
        let run = runs[i];
        if i < last && run <= min_interior && !left_is_merged {
            let left = out.pop().unwrap_or(0);
            out.push(left + run + runs[i + 1]);
            left_is_merged = true;
            i += 2;
        } else {
            out.push(run);
            left_is_merged = false;
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    #[test]
    fn encode_counts_runs() {
        let runs = encode(&[T, T, T, F, F, T, T, F]).unwrap();
        assert_eq!(runs, vec![3, 2, 2, 1]);
        assert_eq!(encode(&[F; 7]).unwrap(), vec![7]);
        assert_eq!(encode(&[]), Err(GridError::EmptyInput));
    }

    #[test]
    fn decode_reverses_encode_for_all_short_sequences() {
        for len in 1..=10usize {
            for bits in 0u32..(1 << len) {
                let seq: Vec<bool> = (0..len).map(|i| bits & (1 << i) != 0).collect();
                let runs = encode(&seq).unwrap();
                assert_eq!(decode(&runs, seq[0]), seq, "bits={bits:#b} len={len}");
            }
        }
    }

    #[test]
    fn midpoints_frame_runs_with_zero_and_total() {
        let mids = midpoints(&[3, 2, 2, 1]);
        assert_eq!(mids, vec![0, 4, 6, 7, 8]);
        for runs in [vec![5], vec![1, 1], vec![10, 3, 7, 2, 9]] {
            let mids = midpoints(&runs);
            assert_eq!(mids.len(), runs.len() + 1);
            assert_eq!(*mids.last().unwrap() as usize, runs.iter().sum::<usize>());
        }
        assert_eq!(midpoints(&[]), vec![0]);
    }

    #[test]
    fn periodicity_sentinel_for_short_sequences() {
        assert_eq!(periodicity(&[]), PERIODICITY_SENTINEL);
        assert_eq!(periodicity(&[1, 50, 1]), PERIODICITY_SENTINEL);
        assert_eq!(periodicity(&[9, 9, 9, 9]), PERIODICITY_SENTINEL);
        // Four runs leave a single interior first difference: still no second difference.
        assert_eq!(periodicity(&[3, 20, 60, 3]), PERIODICITY_SENTINEL);
    }

    #[test]
    fn periodicity_of_flat_pattern_is_sentinel() {
        let runs = [10, 80, 20, 80, 20, 80, 20, 80, 10];
        assert_eq!(periodicity(&runs), PERIODICITY_SENTINEL);
    }

    #[test]
    fn periodicity_of_jittered_pattern_is_small() {
        // interior: 80 18 84 18 80 22 -> first diffs 62 66 66 62 58 -> second 4 0 4 4
        let runs = [10, 80, 18, 84, 18, 80, 22, 12];
        assert!((periodicity(&runs) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn denoise_merges_short_interior_runs() {
        let runs = [10, 40, 2, 38, 20, 40, 20, 40, 15];
        let out = denoise(&runs);
        assert_eq!(out, vec![10, 80, 20, 40, 20, 40, 15]);
        assert_eq!(out.iter().sum::<usize>(), runs.iter().sum::<usize>());
    }

    #[test]
    fn denoise_passes_through_run_after_merge() {
        // 2 at index 2 merges with its neighbours; the 2 at index 4 then has a
        // merged left neighbour and is kept, the 2 at index 6 merges again.
        let runs = [5, 9, 2, 9, 2, 9, 2, 9, 5];
        assert_eq!(denoise(&runs), vec![5, 20, 2, 20, 5]);
    }

    #[test]
    fn denoise_never_grows() {
        let samples: [&[usize]; 5] = [
            &[1, 1, 1],
            &[4, 1, 4, 1, 4],
            &[3, 7, 3, 7, 3, 7],
            &[20, 5, 20, 6, 20, 5, 20],
            &[1, 2, 3, 4, 5, 6, 7, 8],
        ];
        for runs in samples {
            let out = denoise(runs);
            assert!(out.len() <= runs.len(), "{runs:?} -> {out:?}");
            assert_eq!(out.iter().sum::<usize>(), runs.iter().sum::<usize>());
        }
        assert_eq!(denoise(&[4, 2]), vec![4, 2]);
    }
}
