//! [`ImageView`] over owned `image::GrayImage` buffers (strip masks).

use super::traits::ImageView;
use ::image::GrayImage;

impl ImageView for GrayImage {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        GrayImage::width(self) as usize
    }
    #[inline]
    fn height(&self) -> usize {
        GrayImage::height(self) as usize
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let w = GrayImage::width(self) as usize;
        let start = y * w;
        &self.as_raw()[start..start + w]
    }
}

/// Copy a borrowed view into an owned buffer (for `imageproc` operations).
pub fn to_gray_image<I: ImageView<Pixel = u8>>(view: &I) -> GrayImage {
    let (w, h) = (view.width(), view.height());
    let mut data = Vec::with_capacity(w * h);
    for row in view.rows() {
        data.extend_from_slice(row);
    }
    GrayImage::from_raw(w as u32, h as u32, data)
        .unwrap_or_else(|| GrayImage::new(w as u32, h as u32))
}
