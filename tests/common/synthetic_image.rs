use image::{GrayImage, Luma};

/// Layout of a synthetic vending-machine photograph.
///
/// Each button strip is drawn as a full-width highlight band with one bump
/// per slot on top of it, the bump centred in its slot. Alternating bump
/// widths keep the strip profile periodic without being perfectly flat.
#[derive(Clone, Debug)]
pub struct MachineSpec {
    pub width: u32,
    pub height: u32,
    pub background: u8,
    pub highlight: u8,
    pub strip_x: u32,
    pub strip_width: u32,
    /// Top edge of every strip (top of the bumps).
    pub strip_tops: Vec<u32>,
    pub slot_count: u32,
    /// Bump widths, repeated across the slots.
    pub bump_widths: Vec<u32>,
    pub bump_height: u32,
    pub band_height: u32,
}

impl Default for MachineSpec {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            background: 60,
            highlight: 250,
            strip_x: 100,
            strip_width: 800,
            strip_tops: vec![200, 450, 700],
            slot_count: 8,
            bump_widths: vec![40, 44, 40, 36],
            bump_height: 20,
            band_height: 20,
        }
    }
}

impl MachineSpec {
    pub fn slot_width(&self) -> u32 {
        self.strip_width / self.slot_count
    }

    pub fn strip_height(&self) -> u32 {
        self.bump_height + self.band_height
    }
}

/// Render the machine described by `spec`.
pub fn vending_machine(spec: &MachineSpec) -> GrayImage {
    let mut img = GrayImage::from_pixel(spec.width, spec.height, Luma([spec.background]));
    let slot = spec.slot_width();
    for &top in &spec.strip_tops {
        for k in 0..spec.slot_count {
            let bw = spec.bump_widths[k as usize % spec.bump_widths.len()];
            let x0 = spec.strip_x + k * slot + slot / 2 - bw / 2;
            fill(&mut img, x0, top, bw, spec.bump_height, spec.highlight);
        }
        fill(
            &mut img,
            spec.strip_x,
            top + spec.bump_height,
            spec.strip_width,
            spec.band_height,
            spec.highlight,
        );
    }
    img
}

fn fill(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, v: u8) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, Luma([v]));
        }
    }
}

/// Paint `v` over a `w × h` block, e.g. background over part of a strip to
/// split it the way glare does on a real machine.
pub fn paint(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, v: u8) {
    fill(img, x0, y0, w, h, v);
}
