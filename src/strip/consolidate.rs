//! Consolidation of candidate highlight regions into button strips.
//!
//! A physical strip is often detected as several fragments (glare breaks
//! the highlight, or the strip sags across the photograph). Candidates are
//! visited top to bottom; a candidate that touches the margin-expanded box of
//! the previous candidate belongs to the same strip.

use super::ButtonStrip;
use crate::extractor::params::ConsolidationOptions;
use crate::types::Rect;
use image::{GrayImage, Luma};
use imageproc::filter::box_filter;
use log::debug;

/// One candidate produced by a region detector.
///
/// `mask` has the size of `bounds`; non-zero pixels belong to the region.
#[derive(Clone, Debug)]
pub struct RawRegion {
    pub bounds: Rect,
    pub mask: GrayImage,
}

impl RawRegion {
    pub fn new(bounds: Rect, mask: GrayImage) -> Self {
        Self { bounds, mask }
    }

    /// Region whose silhouette fills its whole bounding box.
    pub fn filled(bounds: Rect) -> Self {
        let w = bounds.width.max(0) as u32;
        let h = bounds.height.max(0) as u32;
        Self {
            bounds,
            mask: GrayImage::from_pixel(w, h, Luma([255])),
        }
    }
}

/// Group candidates into strips and assign slot heights.
///
/// `regions` must be sorted by ascending `y`. Groups whose combined box is
/// taller than `max_aspect × width` are dropped.
pub fn consolidate(
    regions: &[RawRegion],
    opts: &ConsolidationOptions,
    detection_threshold: u8,
) -> Vec<ButtonStrip> {
    let mut strips = Vec::new();
    let Some(first) = regions.first() else {
        return strips;
    };

    let mut pending: Vec<&RawRegion> = vec![first];
    for pair in regions.windows(2) {
        let (prev, this) = (&pair[0], &pair[1]);
        let margin = (prev.bounds.width as f32 * opts.margin_fraction) as i32;
        if !this.bounds.intersects(&prev.bounds.expanded(margin)) {
            push_if_valid(&mut strips, build_strip(&pending), opts);
            pending.clear();
        }
        pending.push(this);
    }
    push_if_valid(&mut strips, build_strip(&pending), opts);

    debug!(
        "consolidate: {} candidate region(s) -> {} strip(s)",
        regions.len(),
        strips.len()
    );

    assign_slot_heights(&mut strips, opts);
    for strip in &mut strips {
        strip.detection_threshold = detection_threshold;
    }
    strips
}

fn push_if_valid(strips: &mut Vec<ButtonStrip>, strip: ButtonStrip, opts: &ConsolidationOptions) {
    if strip.region.is_empty() || strip.region.aspect() > opts.max_aspect {
        debug!(
            "consolidate: dropping degenerate strip {:?} (aspect {:.2})",
            strip.region,
            strip.region.aspect()
        );
        return;
    }
    strips.push(strip);
}

/// Combine regions into one strip: joint bounding box, union of silhouettes,
/// softened with a 3×3 box filter.
pub fn build_strip(group: &[&RawRegion]) -> ButtonStrip {
    let Some(region) = group
        .iter()
        .map(|r| r.bounds)
        .reduce(|acc, b| acc.union(&b))
    else {
        return ButtonStrip::new(Rect::default(), GrayImage::new(0, 0));
    };
    let (w, h) = (region.width.max(0) as u32, region.height.max(0) as u32);
    let mut mask = GrayImage::new(w, h);
    for member in group {
        let dx = (member.bounds.x - region.x) as u32;
        let dy = (member.bounds.y - region.y) as u32;
        for (x, y, px) in member.mask.enumerate_pixels() {
            if px[0] != 0 && x + dx < w && y + dy < h {
                mask.put_pixel(x + dx, y + dy, Luma([255]));
            }
        }
    }
    let mask = box_filter(&mask, 1, 1);
    ButtonStrip::new(region, mask)
}

/// Derive each row's slot height from the vertical gap to the strip above.
///
/// The gap is reduced by twice the upper strip's height (the strip itself
/// plus the price labels above it). The top row has no strip above and gets
/// a scaled copy of the second row's height, unless the second row looks
/// inflated compared to the third, in which case the second row's height is
/// used as is.
pub fn assign_slot_heights(strips: &mut [ButtonStrip], opts: &ConsolidationOptions) {
    for i in 1..strips.len() {
        let top = strips[i - 1].region;
        let bottom = strips[i].region;
        let height = bottom.y - top.y - top.height * 2;
        strips[i].slots_height = height;
        if i == 1 {
            strips[0].slots_height = (height as f32 * opts.first_row_factor) as i32;
        }
    }

    if strips.len() > 2
        && strips[1].slots_height as f32 > strips[2].slots_height as f32 * opts.inflated_row_ratio
    {
        strips[0].slots_height = strips[1].slots_height;
    }

    if strips.len() == 1 {
        strips[0].slots_height = opts.single_strip_slots_height;
    }
}
