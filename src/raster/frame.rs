//! In-memory raster frames.

use crate::error::{ArfError, Result};

/// Native panel width in the tall orientation.
pub const PANEL_WIDTH: usize = 320;

/// Native panel height in the tall orientation.
pub const PANEL_HEIGHT: usize = 480;

/// Largest dimension addressable by the i16 coordinates of an ARF stream.
pub const MAX_DIMENSION: usize = i16::MAX as usize;

/// Frame orientation relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 320 wide, 480 high (portrait).
    Tall,
    /// 480 wide, 320 high (landscape).
    Wide,
}

impl Orientation {
    /// Orientation implied by a shape.
    pub fn of(width: usize, height: usize) -> Self {
        if width > height {
            Orientation::Wide
        } else {
            Orientation::Tall
        }
    }
}

/// Quarter-turn direction for [`RasterFrame::rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Width and height of a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameShape {
    pub width: usize,
    pub height: usize,
}

impl FrameShape {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major buffer index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Whether this is the panel resolution in either orientation.
    pub fn is_panel(&self) -> bool {
        matches!(
            (self.width, self.height),
            (PANEL_WIDTH, PANEL_HEIGHT) | (PANEL_HEIGHT, PANEL_WIDTH)
        )
    }
}

/// One decoded frame: a row-major buffer of RGB565 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    orientation: Orientation,
    pixels: Vec<u16>,
}

impl RasterFrame {
    /// Wrap a pixel buffer.
    ///
    /// Fails with [`ArfError::Dimensions`] for empty shapes or shapes that do
    /// not fit stream coordinates, and with [`ArfError::Format`] when the
    /// buffer length disagrees with the shape.
    pub fn new(width: usize, height: usize, pixels: Vec<u16>) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ArfError::Dimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        if pixels.len() != width * height {
            return Err(ArfError::format(format!(
                "pixel buffer holds {} values, {}x{} needs {}",
                pixels.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            orientation: Orientation::of(width, height),
            pixels,
        })
    }

    /// Frame of a single color.
    pub fn filled(width: usize, height: usize, color: u16) -> Result<Self> {
        Self::new(width, height, vec![color; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn shape(&self) -> FrameShape {
        FrameShape::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u16> {
        self.pixels
    }

    /// Color at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Set the color at `(x, y)`. Returns false (and does nothing) outside the frame.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u16) -> bool {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
            true
        } else {
            false
        }
    }

    /// Mirror in place.
    ///
    /// `Tall` swaps rows top to bottom, `Wide` swaps columns left to right.
    pub fn flip(&mut self, axis: Orientation) {
        let (w, h) = (self.width, self.height);
        match axis {
            Orientation::Tall => {
                for row in 0..h / 2 {
                    let mirror = h - 1 - row;
                    for col in 0..w {
                        self.pixels.swap(row * w + col, mirror * w + col);
                    }
                }
            }
            Orientation::Wide => {
                for row in 0..h {
                    let base = row * w;
                    for col in 0..w / 2 {
                        self.pixels.swap(base + col, base + w - 1 - col);
                    }
                }
            }
        }
    }

    /// Rotate a quarter turn, swapping width and height.
    ///
    /// Directions are as displayed for a bottom-up bitmap, where stored row 0
    /// is the bottom of the image.
    pub fn rotate(&mut self, rotation: Rotation) {
        let (w, h) = (self.width, self.height);
        let (new_w, new_h) = (h, w);
        let mut rotated = vec![0u16; self.pixels.len()];

        for y in 0..h {
            for x in 0..w {
                let (nx, ny) = match rotation {
                    Rotation::Clockwise => (y, w - 1 - x),
                    Rotation::CounterClockwise => (h - 1 - y, x),
                };
                rotated[ny * new_w + nx] = self.pixels[y * w + x];
            }
        }

        self.pixels = rotated;
        self.width = new_w;
        self.height = new_h;
        self.orientation = Orientation::of(new_w, new_h);
    }

    /// Number of positions whose colors differ from `other`.
    pub fn diff_count(&self, other: &RasterFrame) -> Result<usize> {
        self.check_same_shape(other)?;
        Ok(self
            .pixels
            .iter()
            .zip(other.pixels.iter())
            .filter(|(a, b)| a != b)
            .count())
    }

    pub(crate) fn check_same_shape(&self, other: &RasterFrame) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(ArfError::ShapeMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> RasterFrame {
        let pixels = (0..(width * height) as u16).collect();
        RasterFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_new_validates_length() {
        assert!(matches!(
            RasterFrame::new(2, 2, vec![0; 3]),
            Err(ArfError::Format(_))
        ));
        assert!(matches!(
            RasterFrame::new(0, 2, vec![]),
            Err(ArfError::Dimensions { .. })
        ));
        assert!(matches!(
            RasterFrame::new(MAX_DIMENSION + 1, 1, vec![0; MAX_DIMENSION + 1]),
            Err(ArfError::Dimensions { .. })
        ));
    }

    #[test]
    fn test_orientation_from_shape() {
        let tall = RasterFrame::filled(PANEL_WIDTH, PANEL_HEIGHT, 0).unwrap();
        let wide = RasterFrame::filled(PANEL_HEIGHT, PANEL_WIDTH, 0).unwrap();
        assert_eq!(tall.orientation(), Orientation::Tall);
        assert_eq!(wide.orientation(), Orientation::Wide);
        assert!(tall.shape().is_panel());
        assert!(!FrameShape::new(2, 2).is_panel());
    }

    #[test]
    fn test_flip_tall_swaps_rows() {
        let mut f = numbered(2, 3);
        f.flip(Orientation::Tall);
        assert_eq!(f.pixels(), &[4, 5, 2, 3, 0, 1]);
    }

    #[test]
    fn test_flip_wide_swaps_columns() {
        let mut f = numbered(3, 2);
        f.flip(Orientation::Wide);
        assert_eq!(f.pixels(), &[2, 1, 0, 5, 4, 3]);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let original = numbered(5, 4);
        let mut f = original.clone();
        f.flip(Orientation::Tall);
        f.flip(Orientation::Tall);
        f.flip(Orientation::Wide);
        f.flip(Orientation::Wide);
        assert_eq!(f, original);
    }

    #[test]
    fn test_rotate_clockwise() {
        // Displayed bottom-up, stored row 0 last:
        //              0 3
        // 3 4 5   ->   1 4
        // 0 1 2        2 5
        let mut f = numbered(3, 2);
        f.rotate(Rotation::Clockwise);
        assert_eq!((f.width(), f.height()), (2, 3));
        assert_eq!(f.pixels(), &[2, 5, 1, 4, 0, 3]);
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        // Displayed bottom-up, stored row 0 last:
        //              5 2
        // 3 4 5   ->   4 1
        // 0 1 2        3 0
        let mut f = numbered(3, 2);
        f.rotate(Rotation::CounterClockwise);
        assert_eq!((f.width(), f.height()), (2, 3));
        assert_eq!(f.pixels(), &[3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_rotate_updates_orientation() {
        let mut f = RasterFrame::filled(PANEL_WIDTH, PANEL_HEIGHT, 7).unwrap();
        f.rotate(Rotation::Clockwise);
        assert_eq!(f.orientation(), Orientation::Wide);
        assert_eq!((f.width(), f.height()), (PANEL_HEIGHT, PANEL_WIDTH));
        f.rotate(Rotation::CounterClockwise);
        assert_eq!(f.orientation(), Orientation::Tall);
    }

    #[test]
    fn test_rotate_inverse() {
        let original = numbered(4, 7);
        let mut f = original.clone();
        f.rotate(Rotation::Clockwise);
        f.rotate(Rotation::CounterClockwise);
        assert_eq!(f, original);
    }

    #[test]
    fn test_pixel_access_bounds() {
        let mut f = numbered(2, 2);
        assert_eq!(f.pixel(1, 1), Some(3));
        assert_eq!(f.pixel(2, 0), None);
        assert!(f.set_pixel(0, 1, 99));
        assert!(!f.set_pixel(0, 2, 99));
        assert_eq!(f.pixel(0, 1), Some(99));
    }

    #[test]
    fn test_diff_count() {
        let a = numbered(2, 2);
        let mut b = a.clone();
        b.set_pixel(1, 0, 50);
        assert_eq!(a.diff_count(&b).unwrap(), 1);
        let c = numbered(4, 1);
        assert!(matches!(
            a.diff_count(&c),
            Err(ArfError::ShapeMismatch { .. })
        ));
    }
}
