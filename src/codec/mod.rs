//! ARF (animation rendering format) delta codec.
//!
//! An ARF stream holds the pixels that change between two consecutive
//! frames, ordered so a panel can draw them in a chosen sweep direction.
//!
//! # File Format
//!
//! All integers are little-endian.
//!
//! ```text
//! Header (8 bytes):
//!   Magic: "AR" (2 bytes)
//!   Entry count: i32 (written as 0, patched once the payload is complete)
//!   Direction: u8 (0 = up, 1 = down, 2 = left, 3 = right)
//!   Encoding: u8 (1 = sparse, 2 = run-length)
//!
//! Sparse payload (entry count = changed pixels):
//!   { x: i16, y: i16, color: u16 } per changed pixel
//!
//! Run-length payload (entry count = lines with changes):
//!   { line: i16, runs: i16, runs * { color: u16, start: i16, end: i16 } }
//! ```

mod format;
mod player;
mod reader;
mod run_length;
mod sparse;
mod traversal;
mod writer;

use std::io::{Cursor, Seek, Write};

pub use format::{ARF_MAGIC, ArfHeader, COUNT_OFFSET, Direction, EncodingKind};
pub use player::Playback;
pub use reader::{ArfReader, Payload};
pub use run_length::{LineRuns, Run, encode_run_length};
pub use sparse::{DeltaEntry, encode_sparse, sparse_entries};
pub use traversal::{Line, LinePoint, Traversal, visit};
pub use writer::ArfWriter;

use crate::error::Result;
use crate::raster::RasterFrame;

/// Convert a frame coordinate to its stream representation.
///
/// Frames reject dimensions above `i16::MAX`, so this never truncates.
#[inline]
pub(crate) fn coord(v: usize) -> i16 {
    debug_assert!(v <= i16::MAX as usize, "coordinate {} exceeds i16", v);
    v as i16
}

/// Outcome of encoding one frame pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    /// Value stored in the header count field.
    pub entry_count: u32,
    /// Stream size including the header.
    pub bytes: u64,
}

/// Encode `previous -> current` into a seekable sink.
///
/// Writes the header at the sink's current position, the payload for
/// `encoding`, and patches the header count. Returns the sink with its
/// cursor at the end of the stream.
pub fn encode_pair<W: Write + Seek>(
    previous: &RasterFrame,
    current: &RasterFrame,
    direction: Direction,
    encoding: EncodingKind,
    sink: W,
) -> Result<(W, EncodeStats)> {
    // Reject before anything reaches the sink
    previous.check_same_shape(current)?;

    let mut writer = ArfWriter::open(sink, direction, encoding)?;
    let entry_count = match encoding {
        EncodingKind::Sparse => encode_sparse(previous, current, &mut writer)?,
        EncodingKind::RunLength => encode_run_length(previous, current, &mut writer)?,
    };
    let bytes = writer.bytes_written();
    let sink = writer.finalize(entry_count)?;

    Ok((sink, EncodeStats { entry_count, bytes }))
}

/// Encode a frame pair into a new buffer.
pub fn encode_to_vec(
    previous: &RasterFrame,
    current: &RasterFrame,
    direction: Direction,
    encoding: EncodingKind,
) -> Result<Vec<u8>> {
    let (cursor, _) = encode_pair(previous, current, direction, encoding, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Encode a frame pair to a sink that cannot seek.
///
/// The stream is assembled in memory and written in one pass once the
/// header count is known.
pub fn encode_to_writer<W: Write>(
    previous: &RasterFrame,
    current: &RasterFrame,
    direction: Direction,
    encoding: EncodingKind,
    sink: &mut W,
) -> Result<EncodeStats> {
    let (cursor, stats) =
        encode_pair(previous, current, direction, encoding, Cursor::new(Vec::new()))?;
    sink.write_all(cursor.get_ref())?;
    sink.flush()?;
    Ok(stats)
}
