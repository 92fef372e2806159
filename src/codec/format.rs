//! Binary format definitions for ARF streams.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArfError;

/// Magic bytes identifying an ARF stream.
pub const ARF_MAGIC: &[u8; 2] = b"AR";

/// Byte offset of the deferred entry count within the header.
pub const COUNT_OFFSET: u64 = 2;

/// Order in which a frame's pixels are visited when encoding and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    /// Rows top to bottom.
    Up = 0,
    /// Rows bottom to top.
    Down = 1,
    /// Columns left to right.
    Left = 2,
    /// Columns right to left.
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// True when lines are rows (Up/Down), false when they are columns.
    pub fn is_row_major(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// True when lines are visited from the far edge back to index 0.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ArfError;

    /// Parse a lowercase direction word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(ArfError::format(format!(
                "Invalid draw direction '{}' (expected up, down, left or right)",
                other
            ))),
        }
    }
}

/// Payload encoding of an ARF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EncodingKind {
    /// One `{x, y, color}` record per differing pixel.
    #[default]
    Sparse = 1,
    /// Per-line blocks of same-color runs.
    RunLength = 2,
}

impl EncodingKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(EncodingKind::Sparse),
            2 => Some(EncodingKind::RunLength),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingKind::Sparse => f.write_str("sparse"),
            EncodingKind::RunLength => f.write_str("run_length"),
        }
    }
}

impl FromStr for EncodingKind {
    type Err = ArfError;

    /// Accepts the numeric header codes as well as the names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "sparse" => Ok(EncodingKind::Sparse),
            "2" | "run_length" => Ok(EncodingKind::RunLength),
            other => Err(ArfError::format(format!(
                "Invalid encoding '{}' (expected 1, 2, sparse or run_length)",
                other
            ))),
        }
    }
}

/// Fixed-size ARF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArfHeader {
    /// Sparse: number of records. RunLength: number of line blocks.
    pub entry_count: u32,
    pub direction: Direction,
    pub encoding: EncodingKind,
}

impl ArfHeader {
    /// Size of header in bytes.
    /// Magic(2) + Count(4) + Direction(1) + Encoding(1) = 8
    pub const SIZE: usize = 8;

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(ARF_MAGIC)?;
        w.write_all(&self.entry_count.to_le_bytes())?;
        w.write_all(&[self.direction.code(), self.encoding.code()])?;
        Ok(())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, ArfError> {
        let mut magic = [0u8; 2];
        r.read_exact(&mut magic)?;
        if &magic != ARF_MAGIC {
            return Err(ArfError::format("Invalid ARF magic bytes"));
        }

        let mut buf4 = [0u8; 4];
        r.read_exact(&mut buf4)?;
        let entry_count = u32::from_le_bytes(buf4);
        if entry_count > i32::MAX as u32 {
            return Err(ArfError::format(format!(
                "Negative ARF entry count: {}",
                entry_count as i32
            )));
        }

        let mut codes = [0u8; 2];
        r.read_exact(&mut codes)?;
        let direction = Direction::from_u8(codes[0]).ok_or_else(|| {
            ArfError::format(format!("Unknown ARF direction code: {}", codes[0]))
        })?;
        let encoding = EncodingKind::from_u8(codes[1]).ok_or_else(|| {
            ArfError::format(format!("Unknown ARF encoding code: {}", codes[1]))
        })?;

        Ok(Self {
            entry_count,
            direction,
            encoding,
        })
    }
}
