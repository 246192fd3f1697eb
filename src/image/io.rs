//! I/O helpers for photographs and JSON reports.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/etc. into an 8-bit luma buffer.
//! - `load_value_image`: read a colour photograph and keep the HSV value
//!   channel (`max(R, G, B)`), which is what highlight thresholds are
//!   detected on.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::u8::ImageU8;
use crate::error::GridError;
use image::GrayImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Borrow an owned grayscale buffer as an `ImageU8` view.
pub fn as_view(image: &GrayImage) -> ImageU8<'_> {
    ImageU8 {
        w: image.width() as usize,
        h: image.height() as usize,
        stride: image.width() as usize,
        data: image.as_raw(),
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImage, GridError> {
    let img = image::open(path)
        .map_err(|e| GridError::Io(format!("Failed to open {}: {e}", path.display())))?;
    Ok(img.into_luma8())
}

/// Load a colour image and return its HSV value channel.
pub fn load_value_image(path: &Path) -> Result<GrayImage, GridError> {
    let rgb = image::open(path)
        .map_err(|e| GridError::Io(format!("Failed to open {}: {e}", path.display())))?
        .into_rgb8();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        image::Luma([r.max(g).max(b)])
    }))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), GridError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        GridError::Io(format!("Failed to serialize JSON for {}: {e}", path.display()))
    })?;
    fs::write(path, json)
        .map_err(|e| GridError::Io(format!("Failed to write JSON {}: {e}", path.display())))
}

fn ensure_parent_dir(path: &Path) -> Result<(), GridError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                GridError::Io(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    Ok(())
}
