//! Direction-ordered pixel traversal.
//!
//! A traversal splits a frame into lines along its outer axis (rows for
//! Up/Down, columns for Left/Right) and visits each line along its inner
//! axis in increasing order. Both encoders and the replay path walk the
//! same sequence, so encode and decode agree on what a line index and an
//! inner position mean.

use super::format::Direction;
use crate::raster::FrameShape;

/// A pixel visited by a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePoint {
    /// Raster column.
    pub x: usize,
    /// Raster row.
    pub y: usize,
    /// Position along the line's inner axis.
    pub position: usize,
}

/// One outer-axis line of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Row index for Up/Down, column index for Left/Right.
    pub index: usize,
    len: usize,
    row_major: bool,
}

impl Line {
    /// Number of pixels on the line.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inner position of the final pixel.
    pub fn last_position(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Raster coordinates of an inner position on this line.
    #[inline]
    pub fn locate(&self, position: usize) -> (usize, usize) {
        if self.row_major {
            (position, self.index)
        } else {
            (self.index, position)
        }
    }

    /// Pixels of the line in inner order.
    pub fn points(&self) -> impl Iterator<Item = LinePoint> + use<> {
        let line = *self;
        (0..line.len).map(move |position| {
            let (x, y) = line.locate(position);
            LinePoint { x, y, position }
        })
    }
}

/// Stateless visitation order for a frame shape and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    shape: FrameShape,
    direction: Direction,
}

impl Traversal {
    pub fn new(shape: FrameShape, direction: Direction) -> Self {
        Self { shape, direction }
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of outer-axis lines.
    pub fn line_count(&self) -> usize {
        if self.direction.is_row_major() {
            self.shape.height
        } else {
            self.shape.width
        }
    }

    /// Pixels per line.
    pub fn line_len(&self) -> usize {
        if self.direction.is_row_major() {
            self.shape.width
        } else {
            self.shape.height
        }
    }

    /// Line with the given outer-axis index, if it exists.
    pub fn line(&self, index: usize) -> Option<Line> {
        (index < self.line_count()).then(|| Line {
            index,
            len: self.line_len(),
            row_major: self.direction.is_row_major(),
        })
    }

    /// Lines in visitation order.
    pub fn lines(&self) -> impl Iterator<Item = Line> + use<> {
        let count = self.line_count();
        let len = self.line_len();
        let row_major = self.direction.is_row_major();
        let reversed = self.direction.is_reversed();
        (0..count).map(move |i| Line {
            index: if reversed { count - 1 - i } else { i },
            len,
            row_major,
        })
    }

    /// Every pixel coordinate `(x, y)` in visitation order.
    pub fn visit(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        self.lines()
            .flat_map(|line| line.points().map(|p| (p.x, p.y)))
    }
}

/// Visitation order of `shape` under `direction`.
pub fn visit(shape: FrameShape, direction: Direction) -> impl Iterator<Item = (usize, usize)> {
    Traversal::new(shape, direction).visit()
}
