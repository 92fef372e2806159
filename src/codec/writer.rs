//! Seekable ARF stream writer.
//!
//! The header entry count and the per-line run counts are unknown until the
//! payload behind them has been written. The writer emits placeholders and
//! patches them in place, so the sink must implement [`Seek`].

use std::io::{self, Seek, SeekFrom, Write};

use super::format::{ArfHeader, COUNT_OFFSET, Direction, EncodingKind};

/// Position of a reserved 2-byte field awaiting its final value.
///
/// Only [`ArfWriter::reserve_u16`] creates slots, so every patch targets a
/// field that was actually reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Slot(u64);

/// Writer over a seekable sink with a deferred header count.
///
/// Usage:
/// ```ignore
/// let mut writer = ArfWriter::open(Cursor::new(Vec::new()), Direction::Up, EncodingKind::Sparse)?;
/// let count = encode_sparse(&previous, &current, &mut writer)?;
/// let bytes = writer.finalize(count)?.into_inner();
/// ```
pub struct ArfWriter<W: Write + Seek> {
    sink: W,
    header_start: u64,
    /// Absolute offset of the end of the stream. Buffered sinks flush on
    /// every seek, so the cursor is tracked here instead of queried.
    position: u64,
    direction: Direction,
    encoding: EncodingKind,
}

impl<W: Write + Seek> ArfWriter<W> {
    /// Write the header with a zero entry count placeholder.
    ///
    /// The header is written at the sink's current position.
    pub fn open(mut sink: W, direction: Direction, encoding: EncodingKind) -> io::Result<Self> {
        let header_start = sink.stream_position()?;

        let header = ArfHeader {
            entry_count: 0, // Patched on finalize
            direction,
            encoding,
        };
        header.write_to(&mut sink)?;

        Ok(Self {
            sink,
            header_start,
            position: header_start + ArfHeader::SIZE as u64,
            direction,
            encoding,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn encoding(&self) -> EncodingKind {
        self.encoding
    }

    /// Bytes written since the start of the header.
    pub fn bytes_written(&self) -> u64 {
        self.position - self.header_start
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub(crate) fn write_u16(&mut self, v: u16) -> io::Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub(crate) fn write_i16(&mut self, v: i16) -> io::Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Write a 2-byte placeholder and return its slot.
    pub(crate) fn reserve_u16(&mut self) -> io::Result<Slot> {
        let slot = Slot(self.position);
        // Distinctive filler so an unpatched field stands out in a hex dump
        self.write_u16(0xABCD)?;
        Ok(slot)
    }

    /// Overwrite a reserved field and return to the end of the stream.
    pub(crate) fn patch_u16(&mut self, slot: Slot, v: u16) -> io::Result<()> {
        debug_assert!(
            slot.0 + 2 <= self.position,
            "slot must precede the write cursor"
        );
        self.sink.seek(SeekFrom::Start(slot.0))?;
        self.sink.write_all(&v.to_le_bytes())?;
        self.sink.seek(SeekFrom::Start(self.position))?;
        Ok(())
    }

    /// Patch the header entry count and hand back the sink.
    ///
    /// The cursor is left at the end of the payload.
    pub fn finalize(mut self, entry_count: u32) -> io::Result<W> {
        // Seek back and rewrite the count
        self.sink
            .seek(SeekFrom::Start(self.header_start + COUNT_OFFSET))?;
        self.sink.write_all(&entry_count.to_le_bytes())?;
        self.sink.seek(SeekFrom::Start(self.position))?;

        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_open_writes_placeholder_header() {
        let writer =
            ArfWriter::open(Cursor::new(Vec::new()), Direction::Down, EncodingKind::Sparse).unwrap();
        let bytes = writer.finalize(0).unwrap().into_inner();
        assert_eq!(bytes, [b'A', b'R', 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_finalize_patches_count_and_keeps_payload() {
        let mut writer =
            ArfWriter::open(Cursor::new(Vec::new()), Direction::Up, EncodingKind::RunLength).unwrap();
        writer.write_i16(-2).unwrap();
        writer.write_u16(0x1234).unwrap();

        let cursor = writer.finalize(0x01020304).unwrap();
        assert_eq!(cursor.position(), 12);
        assert_eq!(
            cursor.into_inner(),
            [b'A', b'R', 4, 3, 2, 1, 0, 2, 0xFE, 0xFF, 0x34, 0x12]
        );
    }

    #[test]
    fn test_reserve_and_patch() {
        let mut writer =
            ArfWriter::open(Cursor::new(Vec::new()), Direction::Up, EncodingKind::RunLength).unwrap();
        let slot = writer.reserve_u16().unwrap();
        writer.write_u16(7).unwrap();
        writer.patch_u16(slot, 3).unwrap();
        writer.write_u16(9).unwrap();
        assert_eq!(writer.bytes_written(), 14);

        let bytes = writer.finalize(1).unwrap().into_inner();
        assert_eq!(&bytes[8..], &[3, 0, 7, 0, 9, 0]);
    }

    #[test]
    fn test_header_at_nonzero_offset() {
        let mut sink = Cursor::new(Vec::new());
        sink.write_all(b"prefix").unwrap();
        let writer = ArfWriter::open(sink, Direction::Left, EncodingKind::Sparse).unwrap();
        let bytes = writer.finalize(5).unwrap().into_inner();
        assert_eq!(&bytes[..6], b"prefix");
        assert_eq!(&bytes[6..], &[b'A', b'R', 5, 0, 0, 0, 2, 1]);
    }

    /// Cursor wrapper counting every seek, including `stream_position`.
    struct SeekCounter {
        inner: Cursor<Vec<u8>>,
        seeks: usize,
    }

    impl Write for SeekCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for SeekCounter {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.seeks += 1;
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_seeks_only_to_patch() {
        let sink = SeekCounter {
            inner: Cursor::new(Vec::new()),
            seeks: 0,
        };
        let mut writer = ArfWriter::open(sink, Direction::Up, EncodingKind::RunLength).unwrap();
        for line in 0..4 {
            writer.write_i16(line).unwrap();
            let slot = writer.reserve_u16().unwrap();
            writer.write_u16(0x1111).unwrap();
            writer.patch_u16(slot, 1).unwrap();
        }
        assert_eq!(writer.bytes_written(), 8 + 4 * 6);

        let sink = writer.finalize(4).unwrap();
        // One position query on open, two seeks per patch, two on finalize
        assert_eq!(sink.seeks, 1 + 4 * 2 + 2);
        assert_eq!(sink.inner.position(), 32);
        assert_eq!(&sink.inner.get_ref()[8..14], &[0, 0, 1, 0, 0x11, 0x11]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "slot must precede the write cursor")]
    fn test_patch_past_cursor_panics() {
        let mut writer =
            ArfWriter::open(Cursor::new(Vec::new()), Direction::Up, EncodingKind::RunLength).unwrap();
        let _ = writer.patch_u16(Slot(ArfHeader::SIZE as u64), 1);
    }
}
