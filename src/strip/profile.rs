//! 1-D intensity profiles of a strip and their binarization.

use crate::image::ImageView;

/// Mean intensity of every column over the full height.
pub fn column_means<I: ImageView<Pixel = u8>>(pixels: &I) -> Vec<f32> {
    let (w, h) = (pixels.width(), pixels.height());
    let mut sums = vec![0u64; w];
    for row in pixels.rows() {
        for (sum, &px) in sums.iter_mut().zip(row) {
            *sum += px as u64;
        }
    }
    if h == 0 {
        return vec![0.0; w];
    }
    sums.into_iter().map(|s| s as f32 / h as f32).collect()
}

/// Column-mean profile followed by a 3-wide moving average.
///
/// Borders are mirrored without repeating the edge sample (`v[1], v[0], v[1]`).
pub fn profile<I: ImageView<Pixel = u8>>(pixels: &I) -> Vec<f32> {
    smooth3(&column_means(pixels))
}

fn smooth3(values: &[f32]) -> Vec<f32> {
    let n = values.len();
    if n < 2 {
        return values.to_vec();
    }
    (0..n)
        .map(|i| {
            let left = if i == 0 { values[1] } else { values[i - 1] };
            let right = if i + 1 == n { values[n - 2] } else { values[i + 1] };
            (left + values[i] + right) / 3.0
        })
        .collect()
}

/// Threshold at the midrange of the profile: samples strictly above it are high.
pub fn binarize(profile: &[f32]) -> (Vec<bool>, f32) {
    if profile.is_empty() {
        return (Vec::new(), 0.0);
    }
    let (min, max) = profile
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let threshold = (max + min) / 2.0;
    let bools = profile.iter().map(|&v| v > threshold).collect();
    (bools, threshold)
}

/// Close gaps narrower than the window by OR-ing every sample with its
/// `window` right neighbours, then the result with its `window` left
/// neighbours.
///
/// Samples in the last `window` positions are not touched by the rightward
/// pass, nor the first `window + 1` by the leftward pass.
pub fn smear(values: &[bool], window: usize) -> Vec<bool> {
    let n = values.len();
    if window == 0 || n <= window {
        return values.to_vec();
    }
    let mut right: Vec<bool> = values.to_vec();
    for i in 0..n - window {
        right[i] = values[i..=i + window].iter().any(|&v| v);
    }
    let mut out = right.clone();
    for i in window + 1..n {
        out[i] = right[i - window..=i].iter().any(|&v| v);
    }
    out
}
