use super::RegionDetector;
use crate::extractor::params::DetectionOptions;
use crate::image::{ImageU8, ImageView};
use crate::strip::RawRegion;
use crate::types::Rect;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;

/// Labels 8-connected blobs above the threshold and keeps the strip-shaped ones.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegionDetector {
    pub opts: DetectionOptions,
}

#[derive(Clone, Copy)]
struct Blob {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    pixels: usize,
}

impl Blob {
    fn bounds(&self) -> Rect {
        Rect::from_corners(
            self.x0 as i32,
            self.y0 as i32,
            self.x1 as i32 + 1,
            self.y1 as i32 + 1,
        )
    }
}

impl ComponentRegionDetector {
    pub fn new(opts: DetectionOptions) -> Self {
        Self { opts }
    }

    fn keep(&self, blob: &Blob, image_w: usize, image_h: usize) -> bool {
        let opts = &self.opts;
        let b = blob.bounds();
        blob.pixels >= opts.min_pixels
            && b.width > b.height * opts.min_aspect as i32
            && b.width > image_w as i32 / opts.width_fraction.max(1) as i32
            && b.y > image_h as i32 / opts.top_fraction.max(1) as i32
    }
}

impl RegionDetector for ComponentRegionDetector {
    fn detect_regions(&self, image: &ImageU8, threshold: u8) -> Vec<RawRegion> {
        let (w, h) = (image.w as u32, image.h as u32);
        let binary = GrayImage::from_fn(w, h, |x, y| {
            if image.pixel(x as usize, y as usize) > threshold {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));

        let mut blobs: Vec<Option<Blob>> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let id = label[0] as usize;
            if id == 0 {
                continue;
            }
            if id >= blobs.len() {
                blobs.resize(id + 1, None);
            }
            match &mut blobs[id] {
                Some(b) => {
                    b.x0 = b.x0.min(x);
                    b.y0 = b.y0.min(y);
                    b.x1 = b.x1.max(x);
                    b.y1 = b.y1.max(y);
                    b.pixels += 1;
                }
                slot => {
                    *slot = Some(Blob {
                        x0: x,
                        y0: y,
                        x1: x,
                        y1: y,
                        pixels: 1,
                    })
                }
            }
        }

        let total = blobs.iter().flatten().count();
        let mut regions: Vec<RawRegion> = blobs
            .iter()
            .enumerate()
            .filter_map(|(id, blob)| blob.map(|b| (id as u32, b)))
            .filter(|(_, b)| self.keep(b, image.w, image.h))
            .map(|(id, b)| {
                let mask = GrayImage::from_fn(b.x1 - b.x0 + 1, b.y1 - b.y0 + 1, |x, y| {
                    if labels.get_pixel(x + b.x0, y + b.y0)[0] == id {
                        Luma([255])
                    } else {
                        Luma([0])
                    }
                });
                RawRegion::new(b.bounds(), mask)
            })
            .collect();
        regions.sort_by_key(|r| (r.bounds.y, r.bounds.x));

        debug!(
            "ComponentRegionDetector::detect_regions threshold={} components={} kept={}",
            threshold,
            total,
            regions.len()
        );
        regions
    }
}
