//! Trimming of drink rectangles to the visible container.
//!
//! A slot rectangle usually reaches well above the sample container it
//! frames; that upper part is flat machine background. Drink containers are
//! rich in corners (labels, caps, printing) while the background has almost
//! none, so the largest corner-free band of rows starting at the top of the
//! slot is cut away.

use crate::extractor::params::RectOptions;
use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Harris corner response per pixel, row-major.
///
/// The structure tensor is accumulated over a 3×3 window (clamped at the
/// borders) from Sobel gradients; `R = det(M) − k·trace(M)²`.
pub fn harris_response(image: &GrayImage, k: f64) -> Vec<f64> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);
    let mut xx = vec![0f64; w * h];
    let mut yy = vec![0f64; w * h];
    let mut xy = vec![0f64; w * h];
    for (i, (&dx, &dy)) in gx.as_raw().iter().zip(gy.as_raw()).enumerate() {
        let (dx, dy) = (dx as f64, dy as f64);
        xx[i] = dx * dx;
        yy[i] = dy * dy;
        xy[i] = dx * dy;
    }

    let mut response = vec![0f64; w * h];
    for y in 0..h {
        let rows = y.saturating_sub(1)..=(y + 1).min(h - 1);
        for x in 0..w {
            let cols = x.saturating_sub(1)..=(x + 1).min(w - 1);
            let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
            for sy in rows.clone() {
                for sx in cols.clone() {
                    let i = sy * w + sx;
                    a += xx[i];
                    b += yy[i];
                    c += xy[i];
                }
            }
            let trace = a + b;
            response[y * w + x] = a * b - c * c - k * trace * trace;
        }
    }
    response
}

/// Rows containing at least one response above `ratio × max`.
///
/// A response without any positive value marks nothing.
pub fn corner_rows(response: &[f64], width: usize, ratio: f32) -> Vec<usize> {
    let max = response.iter().copied().fold(0.0f64, f64::max);
    if width == 0 || max <= 0.0 {
        return Vec::new();
    }
    let threshold = max * ratio as f64;
    response
        .chunks(width)
        .enumerate()
        .filter(|(_, row)| row.iter().any(|&r| r > threshold))
        .map(|(y, _)| y)
        .collect()
}

/// Number of rows to cut from the top of a slot crop.
///
/// The widest gap between consecutive corner rows (counting from row 0) is
/// taken as background and everything above its lower end is cut, unless
/// what remains would be shorter than `min_trimmed_aspect × width`.
pub fn trim_offset(slot: &GrayImage, opts: &RectOptions) -> i32 {
    let (w, h) = (slot.width() as i32, slot.height() as i32);
    let response = harris_response(slot, opts.harris_k as f64);
    let marked = corner_rows(&response, w as usize, opts.corner_threshold_ratio);

    let (mut top, mut bottom, mut prev) = (0i32, 0i32, 0i32);
    for &y in &marked {
        let y = y as i32;
        if y - prev > bottom - top {
            top = prev;
            bottom = y;
        }
        prev = y;
    }

    if ((h - bottom) as f32) < w as f32 * opts.min_trimmed_aspect {
        return 0;
    }
    bottom
}
