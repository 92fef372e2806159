//! Raster module - RGB565 pixels, in-memory frames and the BMP boundary.

pub mod bmp;
mod frame;
mod pixel;

pub use frame::*;
pub use pixel::*;
