//! Reading and replaying ARF streams.

use std::io::Cursor;

use log::warn;

use super::format::{ArfHeader, Direction, EncodingKind};
use super::run_length::LineRuns;
use super::sparse::DeltaEntry;
use super::traversal::Traversal;
use crate::error::{ArfError, Result};
use crate::raster::RasterFrame;

/// Decoded payload of an ARF stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Sparse(Vec<DeltaEntry>),
    RunLength(Vec<LineRuns>),
}

impl Payload {
    /// Number of pixels the payload overwrites when replayed.
    pub fn pixel_count(&self) -> usize {
        match self {
            Payload::Sparse(entries) => entries.len(),
            Payload::RunLength(lines) => lines.iter().map(LineRuns::pixel_count).sum(),
        }
    }
}

/// A parsed header over a borrowed payload.
///
/// Usage:
/// ```ignore
/// let reader = ArfReader::open(&bytes)?;
/// println!("{} entries drawn {}", reader.entry_count(), reader.direction());
/// let mut frame = previous.clone();
/// reader.replay(&mut frame)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArfReader<'a> {
    header: ArfHeader,
    payload: &'a [u8],
}

impl<'a> ArfReader<'a> {
    /// Validate the header and split off the payload.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = ArfHeader::read_from(&mut cursor)?;
        Ok(Self {
            header,
            payload: &bytes[ArfHeader::SIZE..],
        })
    }

    pub fn header(&self) -> &ArfHeader {
        &self.header
    }

    pub fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    pub fn direction(&self) -> Direction {
        self.header.direction
    }

    pub fn encoding(&self) -> EncodingKind {
        self.header.encoding
    }

    /// Raw payload bytes following the header.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Parse the whole payload according to the header.
    ///
    /// Fails with an I/O error when the payload is shorter than the header
    /// count implies.
    pub fn decode(&self) -> Result<Payload> {
        let mut cursor = Cursor::new(self.payload);
        let count = self.header.entry_count as usize;

        let payload = match self.header.encoding {
            EncodingKind::Sparse => {
                let mut entries = Vec::with_capacity(count.min(self.payload.len() / DeltaEntry::SIZE));
                for _ in 0..count {
                    entries.push(DeltaEntry::read_from(&mut cursor)?);
                }
                Payload::Sparse(entries)
            }
            EncodingKind::RunLength => {
                let mut lines = Vec::new();
                for _ in 0..count {
                    lines.push(LineRuns::read_from(&mut cursor)?);
                }
                Payload::RunLength(lines)
            }
        };

        let consumed = cursor.position() as usize;
        if consumed < self.payload.len() {
            warn!(
                "ARF payload has {} trailing bytes after {} entries",
                self.payload.len() - consumed,
                count
            );
        }
        Ok(payload)
    }

    /// Sparse records, failing if the stream is run-length encoded.
    pub fn sparse_entries(&self) -> Result<Vec<DeltaEntry>> {
        match self.decode()? {
            Payload::Sparse(entries) => Ok(entries),
            Payload::RunLength(_) => Err(ArfError::format("ARF stream is run-length encoded")),
        }
    }

    /// Line blocks, failing if the stream is sparse encoded.
    pub fn line_runs(&self) -> Result<Vec<LineRuns>> {
        match self.decode()? {
            Payload::RunLength(lines) => Ok(lines),
            Payload::Sparse(_) => Err(ArfError::format("ARF stream is sparse encoded")),
        }
    }

    /// Overlay the stream onto `frame` using the header's direction.
    ///
    /// Returns the number of pixels written.
    pub fn replay(&self, frame: &mut RasterFrame) -> Result<usize> {
        self.replay_as(frame, self.header.direction)
    }

    /// Overlay the stream onto `frame`, interpreting run-length lines with
    /// `direction`.
    ///
    /// The direction byte is the only record of how line indices map to
    /// raster axes. Replaying with a different direction produces a wrong
    /// image; positions that fall outside the frame are skipped rather than
    /// reported. Sparse records carry raster coordinates and ignore
    /// `direction`.
    pub fn replay_as(&self, frame: &mut RasterFrame, direction: Direction) -> Result<usize> {
        let mut written = 0;

        match self.decode()? {
            Payload::Sparse(entries) => {
                for e in entries {
                    if e.x >= 0 && e.y >= 0 && frame.set_pixel(e.x as usize, e.y as usize, e.color)
                    {
                        written += 1;
                    }
                }
            }
            Payload::RunLength(lines) => {
                let traversal = Traversal::new(frame.shape(), direction);
                for block in lines {
                    let Some(line) = usize::try_from(block.index)
                        .ok()
                        .and_then(|i| traversal.line(i))
                    else {
                        continue;
                    };
                    for run in &block.runs {
                        let start = run.start.max(0) as usize;
                        let end = usize::try_from(run.end).unwrap_or(0).min(line.last_position());
                        if run.end < 0 || start > end {
                            continue;
                        }
                        for position in start..=end {
                            let (x, y) = line.locate(position);
                            if frame.set_pixel(x, y, run.color) {
                                written += 1;
                            }
                        }
                    }
                }
            }
        }

        Ok(written)
    }
}
