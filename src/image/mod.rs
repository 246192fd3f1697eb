//! Grayscale image access used by the strip analysis.
//!
//! The analysis only ever reads 8-bit intensities row by row, so every
//! pixel source is exposed through [`ImageView`]: the borrowed [`ImageU8`]
//! view over a photograph (with zero-copy sub-views) and owned
//! `image::GrayImage` buffers such as strip masks.

pub mod gray;
pub mod io;
pub mod traits;
pub mod u8;

pub use self::traits::{ImageView, Rows};
pub use self::u8::ImageU8;
