use crate::rects::SlotRow;
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle in photograph coordinates.
///
/// `width`/`height` are signed so that intermediate geometry (e.g. a slot
/// height derived from a strip that overlaps the one above) can go negative
/// and be rejected by validity checks instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its top-left and (exclusive) bottom-right corners.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Area in pixels; zero for empty or inverted rectangles.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap of two rectangles, or an all-zero rect when they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect::from_corners(x0, y0, x1, y1)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersect(other).area() != 0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow by `margin` pixels on every side.
    pub fn expanded(&self, margin: i32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    pub fn clipped_to(&self, bounds: &Rect) -> Rect {
        self.intersect(bounds)
    }

    /// `height / width` as a float; infinite for zero-width rectangles.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            f32::INFINITY
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// Slot grid inferred from one photograph.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotGridResult {
    pub slot_count: usize,
    pub mean_slot_width: f32,
    /// Absolute x positions of the column boundaries, `slot_count + 1` entries.
    pub column_edges: Vec<i32>,
    /// Output rows, top to bottom.
    pub rows: Vec<SlotRow>,
    pub detection_threshold: u8,
    pub latency_ms: f64,
}

impl SlotGridResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `10 × slot_count + row_count`, e.g. 83 for eight columns and three rows.
    pub fn configuration_code(&self) -> i32 {
        (10 * self.slot_count + self.row_count()) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersect(&b).area(), 0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn expanded_rect_reaches_neighbour() {
        let a = Rect::new(100, 200, 300, 30);
        let b = Rect::new(420, 205, 300, 30);
        assert!(!a.intersects(&b));
        assert!(a.expanded(30).intersects(&b));
        assert_eq!(a.union(&b), Rect::new(100, 200, 620, 35));
    }

    #[test]
    fn clipping_keeps_inside_part() {
        let bounds = Rect::new(0, 0, 640, 480);
        let r = Rect::new(-20, 400, 100, 200);
        assert_eq!(r.clipped_to(&bounds), Rect::new(0, 400, 80, 80));
    }

    #[test]
    fn configuration_code_combines_slots_and_rows() {
        let row = SlotRow {
            strip_index: 0,
            strip_region: Rect::new(0, 100, 500, 20),
            slots_height: 80,
            drinks: Vec::new(),
            prices: Vec::new(),
            price_strip: Rect::default(),
        };
        let result = SlotGridResult {
            slot_count: 6,
            mean_slot_width: 83.3,
            column_edges: vec![0, 83, 167, 250, 333, 417, 500],
            rows: vec![row.clone(), row],
            detection_threshold: 220,
            latency_ms: 0.0,
        };
        assert_eq!(result.configuration_code(), 62);
    }
}
