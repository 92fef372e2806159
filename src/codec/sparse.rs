//! Sparse delta encoding: one record per changed pixel.

use std::io::{self, Read, Seek, Write};

use log::debug;

use super::coord;
use super::traversal::Traversal;
use super::writer::ArfWriter;
use crate::error::Result;
use crate::raster::RasterFrame;

/// A single changed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    pub x: i16,
    pub y: i16,
    pub color: u16,
}

impl DeltaEntry {
    /// Size of one record in bytes.
    pub const SIZE: usize = 6;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.x.to_le_bytes())?;
        w.write_all(&self.y.to_le_bytes())?;
        w.write_all(&self.color.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)?;
        Ok(Self {
            x: i16::from_le_bytes([buf[0], buf[1]]),
            y: i16::from_le_bytes([buf[2], buf[3]]),
            color: u16::from_le_bytes([buf[4], buf[5]]),
        })
    }
}

/// Changed pixels of `current` relative to `previous`, in traversal order.
///
/// Positions are raster coordinates regardless of the traversal axis.
/// Fails when the frames differ in shape.
pub fn sparse_entries<'a>(
    previous: &'a RasterFrame,
    current: &'a RasterFrame,
    traversal: Traversal,
) -> Result<impl Iterator<Item = DeltaEntry> + 'a> {
    previous.check_same_shape(current)?;
    let shape = current.shape();
    let (before, after) = (previous.pixels(), current.pixels());

    Ok(traversal.visit().filter_map(move |(x, y)| {
        let i = shape.index(x, y);
        (before[i] != after[i]).then(|| DeltaEntry {
            x: coord(x),
            y: coord(y),
            color: after[i],
        })
    }))
}

/// Write the sparse payload for a frame pair.
///
/// Traverses in the writer's direction and returns the number of records,
/// which is the value the header count must be finalized with.
pub fn encode_sparse<W: Write + Seek>(
    previous: &RasterFrame,
    current: &RasterFrame,
    writer: &mut ArfWriter<W>,
) -> Result<u32> {
    let traversal = Traversal::new(current.shape(), writer.direction());
    let mut count = 0u32;

    for entry in sparse_entries(previous, current, traversal)? {
        writer.write_i16(entry.x)?;
        writer.write_i16(entry.y)?;
        writer.write_u16(entry.color)?;
        count += 1;
    }

    debug!("sparse encode ({}): {} changed pixels", writer.direction(), count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Direction, EncodingKind};
    use crate::error::ArfError;
    use crate::raster::FrameShape;
    use std::io::Cursor;

    fn frame(width: usize, height: usize, pixels: &[u16]) -> RasterFrame {
        RasterFrame::new(width, height, pixels.to_vec()).unwrap()
    }

    fn encode(previous: &RasterFrame, current: &RasterFrame, dir: Direction) -> (u32, Vec<u8>) {
        let mut writer =
            ArfWriter::open(Cursor::new(Vec::new()), dir, EncodingKind::Sparse).unwrap();
        let count = encode_sparse(previous, current, &mut writer).unwrap();
        (count, writer.finalize(count).unwrap().into_inner())
    }

    fn decode_entries(bytes: &[u8]) -> Vec<DeltaEntry> {
        bytes[8..]
            .chunks_exact(DeltaEntry::SIZE)
            .map(|mut c| DeltaEntry::read_from(&mut c).unwrap())
            .collect()
    }

    #[test]
    fn test_identical_frames_emit_nothing() {
        let a = frame(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        for dir in Direction::ALL {
            let (count, bytes) = encode(&a, &a.clone(), dir);
            assert_eq!(count, 0);
            assert_eq!(bytes.len(), 8);
        }
    }

    #[test]
    fn test_two_by_two_scenario() {
        let prior = frame(2, 2, &[0, 0, 0, 0]);
        let current = frame(2, 2, &[5, 5, 0, 7]);
        let (count, bytes) = encode(&prior, &current, Direction::Up);

        assert_eq!(count, 3);
        assert_eq!(&bytes[2..6], &3u32.to_le_bytes());
        assert_eq!(
            decode_entries(&bytes),
            vec![
                DeltaEntry { x: 0, y: 0, color: 5 },
                DeltaEntry { x: 1, y: 0, color: 5 },
                DeltaEntry { x: 1, y: 1, color: 7 },
            ]
        );
    }

    #[test]
    fn test_single_pixel_every_direction() {
        let prior = RasterFrame::filled(5, 4, 0).unwrap();
        let mut current = prior.clone();
        current.set_pixel(3, 1, 0xBEEF);

        for dir in Direction::ALL {
            let (count, bytes) = encode(&prior, &current, dir);
            assert_eq!(count, 1);
            assert_eq!(
                decode_entries(&bytes),
                vec![DeltaEntry { x: 3, y: 1, color: 0xBEEF }]
            );
        }
    }

    #[test]
    fn test_order_follows_direction() {
        let prior = frame(2, 2, &[0, 0, 0, 0]);
        let current = frame(2, 2, &[1, 2, 3, 4]);
        let t = Traversal::new(FrameShape::new(2, 2), Direction::Right);
        let order: Vec<_> = sparse_entries(&prior, &current, t)
            .unwrap()
            .map(|e| e.color)
            .collect();
        // Right walks column 1 then column 0, each top to bottom
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_color_is_current_frame() {
        let prior = frame(2, 1, &[9, 9]);
        let current = frame(2, 1, &[9, 4]);
        let (_, bytes) = encode(&prior, &current, Direction::Down);
        assert_eq!(decode_entries(&bytes)[0].color, 4);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = RasterFrame::filled(2, 3, 0).unwrap();
        let b = RasterFrame::filled(3, 2, 0).unwrap();
        let mut writer =
            ArfWriter::open(Cursor::new(Vec::new()), Direction::Up, EncodingKind::Sparse).unwrap();
        assert!(matches!(
            encode_sparse(&a, &b, &mut writer),
            Err(ArfError::ShapeMismatch { .. })
        ));
    }
}
