//! ARF animation codec.
//!
//! Encodes the pixel differences between consecutive RGB565 frames into
//! compact ARF streams that a small display panel replays in a chosen sweep
//! direction, and decodes/replays those streams.
//!
//! # Architecture
//!
//! - `raster`: RGB565 pixels, frames, and the 16-bit BMP loader
//! - `codec`: traversal order, sparse and run-length encoders, stream I/O
//! - `sequence`: manifests and the batch encoder for whole animations
//!
//! # Example
//!
//! ```rust,no_run
//! use arf_codec::{
//!     codec::{ArfReader, Direction, EncodingKind, encode_to_vec},
//!     raster::RasterFrame,
//! };
//!
//! let previous = RasterFrame::filled(320, 480, 0x0000)?;
//! let mut current = previous.clone();
//! current.set_pixel(10, 20, 0xFFFF);
//!
//! let bytes = encode_to_vec(&previous, &current, Direction::Up, EncodingKind::RunLength)?;
//!
//! let mut frame = previous.clone();
//! ArfReader::open(&bytes)?.replay(&mut frame)?;
//! assert_eq!(frame, current);
//! # Ok::<(), arf_codec::ArfError>(())
//! ```

pub mod codec;
pub mod error;
pub mod raster;
pub mod sequence;

// Re-export commonly used types
pub use codec::{ArfReader, Direction, EncodingKind, encode_pair, encode_to_vec};
pub use error::{ArfError, Result};
pub use raster::{RasterFrame, Rgb565};
pub use sequence::{SequenceConfig, SequenceReport, encode_sequence};
