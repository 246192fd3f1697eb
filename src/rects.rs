//! Drink and price-label rectangles for every accepted row.
//!
//! Rows share the consensus column edges, so every row is aligned on the
//! reference strip's columns regardless of where its own strip starts. The
//! slots of a row sit directly above its button strip; the bottom of each
//! slot is the price label. Drink rectangles can afterwards be trimmed to
//! the container they frame ([`SlotRectBuilder::trim_to_container`]).

use crate::consensus::GridConsensus;
use crate::extractor::params::RectOptions;
use crate::image::gray::to_gray_image;
use crate::image::ImageU8;
use crate::strip::ButtonStrip;
use crate::trim::trim_offset;
use crate::types::Rect;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

/// Rectangles of one machine row, left to right.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow {
    pub strip_index: usize,
    pub strip_region: Rect,
    pub slots_height: i32,
    pub drinks: Vec<Rect>,
    pub prices: Vec<Rect>,
    /// Band holding the price tags of the whole row.
    pub price_strip: Rect,
}

#[derive(Clone, Debug, Default)]
pub struct SlotRectBuilder {
    pub opts: RectOptions,
}

impl SlotRectBuilder {
    pub fn new(opts: RectOptions) -> Self {
        Self { opts }
    }

    /// Build one row per accepted strip. `photo` bounds the output rectangles.
    pub fn build(
        &self,
        strips: &[ButtonStrip],
        consensus: &GridConsensus,
        photo: Rect,
    ) -> Vec<SlotRow> {
        let reference = consensus.reference_region;
        let tag_height = (reference.width as f32
            / consensus.slot_count.max(1) as f32
            / self.opts.label_aspect) as i32;

        let rows: Vec<SlotRow> = consensus
            .accepted
            .iter()
            .filter_map(|&i| strips.get(i).map(|strip| (i, strip)))
            .map(|(i, strip)| {
                let (drinks, prices) = self.row_rects(strip, &consensus.column_edges, photo);
                let price_strip = Rect::new(
                    reference.x,
                    strip.region.y - tag_height,
                    strip.region.width,
                    tag_height,
                )
                .clipped_to(&photo);
                SlotRow {
                    strip_index: i,
                    strip_region: strip.region,
                    slots_height: strip.slots_height,
                    drinks,
                    prices,
                    price_strip,
                }
            })
            .collect();

        debug!(
            "SlotRectBuilder::build rows={} drinks={}",
            rows.len(),
            rows.iter().map(|r| r.drinks.len()).sum::<usize>()
        );
        rows
    }

    fn row_rects(
        &self,
        strip: &ButtonStrip,
        edges: &[i32],
        photo: Rect,
    ) -> (Vec<Rect>, Vec<Rect>) {
        let mut drinks = Vec::with_capacity(edges.len().saturating_sub(1));
        let mut prices = Vec::with_capacity(edges.len().saturating_sub(1));
        let strip_top = strip.region.y;
        for pair in edges.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let width = b - a;
            if width <= 0 {
                continue;
            }
            let label_height = (width as f32 / self.opts.label_aspect) as i32;
            let drink = Rect::new(
                a,
                strip_top - strip.slots_height,
                width,
                strip.slots_height - label_height,
            );
            if !self.is_valid(&drink) {
                debug!("SlotRectBuilder::row_rects dropping slot {:?}", drink);
                continue;
            }
            let drink = drink.clipped_to(&photo);
            if drink.is_empty() {
                debug!("SlotRectBuilder::row_rects slot at x={} lies outside the photo", a);
                continue;
            }
            let price = Rect::new(a, strip_top - label_height, width, label_height);
            drinks.push(drink);
            prices.push(price.clipped_to(&photo));
        }
        (drinks, prices)
    }

    /// Cut the flat background off the top of every drink rectangle.
    ///
    /// `gray` is the photograph the rows were built for. Rows are trimmed in
    /// parallel; rectangles are only ever shortened from the top.
    pub fn trim_to_container(&self, rows: &mut [SlotRow], gray: &ImageU8) {
        rows.par_iter_mut().for_each(|row| {
            for drink in &mut row.drinks {
                let Some(view) = gray.sub_view(drink) else {
                    continue;
                };
                let offset = trim_offset(&to_gray_image(&view), &self.opts);
                if offset > 0 {
                    debug!(
                        "SlotRectBuilder::trim_to_container row {} {:?} cut {} px",
                        row.strip_index, drink, offset
                    );
                    drink.y += offset;
                    drink.height -= offset;
                }
            }
        });
    }

    /// Size and shape limits for a drink rectangle (before clipping).
    pub fn is_valid(&self, rect: &Rect) -> bool {
        let opts = &self.opts;
        rect.area() > 0
            && rect.width >= opts.min_width
            && rect.height <= opts.max_height_ratio * rect.width
            && rect.width <= opts.max_width_ratio * rect.height
    }
}
