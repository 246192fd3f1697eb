use super::traits::ImageView;
use crate::types::Rect;

/// Borrowed 8-bit grayscale photograph; rows start every `stride` bytes.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Full-image rectangle in photograph coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.w as i32, self.h as i32)
    }

    /// Borrow the part of the image covered by `rect`, clipped to the bounds.
    ///
    /// Returns `None` when the clipped rectangle is empty. No pixels are
    /// copied; the view keeps the parent stride.
    pub fn sub_view(&self, rect: &Rect) -> Option<ImageU8<'a>> {
        let clipped = rect.clipped_to(&self.bounds());
        if clipped.is_empty() {
            return None;
        }
        let (x, y) = (clipped.x as usize, clipped.y as usize);
        let (w, h) = (clipped.width as usize, clipped.height as usize);
        let start = y * self.stride + x;
        let end = (y + h - 1) * self.stride + x + w;
        Some(ImageU8 {
            w,
            h,
            stride: self.stride,
            data: &self.data[start..end],
        })
    }
}

impl<'a> ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_view_shares_parent_stride() {
        let data: Vec<u8> = (0..100u8).collect();
        let img = ImageU8 {
            w: 10,
            h: 10,
            stride: 10,
            data: &data,
        };
        let sub = img.sub_view(&Rect::new(2, 3, 4, 2)).expect("inside bounds");
        assert_eq!(sub.row(0), &[32, 33, 34, 35]);
        assert_eq!(sub.row(1), &[42, 43, 44, 45]);
        assert!(img.sub_view(&Rect::new(20, 20, 5, 5)).is_none());
    }
}
