//! Run-length delta encoding.
//!
//! Each traversal line with at least one changed pixel becomes a block:
//!
//! ```text
//! line_index: i16
//! run_count:  i16 (reserved, patched once the line is scanned)
//! run_count x { color: u16, start: i16, end: i16 }
//! ```
//!
//! A run is a maximal span of changed pixels sharing one color in the current
//! frame. Opening a run writes `color, start`; closing it writes `end`. A run
//! always closes before the next one opens, so the record layout above holds.

use std::io::{self, Read, Seek, Write};

use log::debug;

use super::coord;
use super::traversal::Traversal;
use super::writer::{ArfWriter, Slot};
use crate::error::Result;
use crate::raster::RasterFrame;

/// A span of one color along a line's inner axis, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub color: u16,
    pub start: i16,
    pub end: i16,
}

impl Run {
    /// Size of one run record in bytes.
    pub const SIZE: usize = 6;

    /// Number of pixels covered (zero for malformed runs with end < start).
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (i32::from(self.end) - i32::from(self.start)) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)?;
        Ok(Self {
            color: u16::from_le_bytes([buf[0], buf[1]]),
            start: i16::from_le_bytes([buf[2], buf[3]]),
            end: i16::from_le_bytes([buf[4], buf[5]]),
        })
    }
}

/// All runs recorded for one traversal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRuns {
    /// Row for Up/Down, column for Left/Right.
    pub index: i16,
    pub runs: Vec<Run>,
}

impl LineRuns {
    /// Read one line block: index, run count, then the runs.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf2 = [0u8; 2];
        r.read_exact(&mut buf2)?;
        let index = i16::from_le_bytes(buf2);

        r.read_exact(&mut buf2)?;
        let run_count = u16::from_le_bytes(buf2);

        let mut runs = Vec::with_capacity(run_count as usize);
        for _ in 0..run_count {
            runs.push(Run::read_from(r)?);
        }
        Ok(Self { index, runs })
    }

    /// Total pixels covered by the line's runs.
    pub fn pixel_count(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }
}

/// Per-line encoder state.
struct LineState {
    count_slot: Option<Slot>,
    runs: u16,
    on_run: bool,
    last_color: u16,
}

impl LineState {
    fn new() -> Self {
        Self {
            count_slot: None,
            runs: 0,
            on_run: false,
            last_color: 0,
        }
    }

    fn open_run<W: Write + Seek>(
        &mut self,
        writer: &mut ArfWriter<W>,
        color: u16,
        position: usize,
    ) -> io::Result<()> {
        debug_assert!(!self.on_run, "opening a run while another is open");
        writer.write_u16(color)?;
        writer.write_i16(coord(position))?;
        self.last_color = color;
        self.runs += 1;
        self.on_run = true;
        Ok(())
    }

    fn close_run<W: Write + Seek>(
        &mut self,
        writer: &mut ArfWriter<W>,
        end: usize,
    ) -> io::Result<()> {
        debug_assert!(self.on_run, "closing a run that was never opened");
        writer.write_i16(coord(end))?;
        self.on_run = false;
        Ok(())
    }
}

/// Write the run-length payload for a frame pair.
///
/// Traverses in the writer's direction. Returns the number of lines that
/// received a block, not the number of runs; the header count must be
/// finalized with this value.
pub fn encode_run_length<W: Write + Seek>(
    previous: &RasterFrame,
    current: &RasterFrame,
    writer: &mut ArfWriter<W>,
) -> Result<u32> {
    previous.check_same_shape(current)?;
    let shape = current.shape();
    let traversal = Traversal::new(shape, writer.direction());
    let (before, after) = (previous.pixels(), current.pixels());

    let mut lines_touched = 0u32;
    let mut total_runs = 0usize;

    for line in traversal.lines() {
        let mut state = LineState::new();

        for point in line.points() {
            let i = shape.index(point.x, point.y);
            let color = after[i];

            if before[i] != color {
                if state.count_slot.is_none() {
                    // First change on this line: block header, then the first run
                    writer.write_i16(coord(line.index))?;
                    state.count_slot = Some(writer.reserve_u16()?);
                    state.open_run(writer, color, point.position)?;
                    lines_touched += 1;
                } else if !state.on_run {
                    // Resuming after a gap on an already-started line
                    state.open_run(writer, color, point.position)?;
                } else if color != state.last_color {
                    state.close_run(writer, point.position - 1)?;
                    state.open_run(writer, color, point.position)?;
                }
            } else if state.on_run {
                state.close_run(writer, point.position - 1)?;
            }
        }

        if state.on_run {
            state.close_run(writer, line.last_position())?;
        }

        if let Some(slot) = state.count_slot {
            writer.patch_u16(slot, state.runs)?;
            total_runs += state.runs as usize;
        }
    }

    debug!(
        "run-length encode ({}): {} lines, {} runs",
        writer.direction(),
        lines_touched,
        total_runs
    );
    Ok(lines_touched)
}
