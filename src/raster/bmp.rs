//! Minimal BMP reader/writer for 16-bit RGB565 bit-field bitmaps.
//!
//! Only the header subset the panel tooling relies on is interpreted:
//!
//! ```text
//! File header (14 bytes):
//!   Magic: "BM"
//!   File size: u32
//!   Reserved: 4 bytes
//!   Pixel data offset: u32
//! Info header:
//!   Header size: u32 (skipped)
//!   Width: i32
//!   Height: i32
//!   Planes: u16 (must be 1)
//!   Bits per pixel: u16 (must be 16)
//!   Compression: u32 (must be 3, bit-fields)
//! ```
//!
//! The compression field is compared as a full u32. The legacy panel tooling
//! only checked its low two bytes, so it accepted headers that this rejects.
//!
//! Rows are kept in stored order; no bottom-up flip is applied.

use std::io::{self, Cursor, Read};

use log::warn;

use super::frame::{FrameShape, RasterFrame};
use crate::error::{ArfError, Result};

/// Magic bytes identifying a BMP file.
pub const BMP_MAGIC: &[u8; 2] = b"BM";

/// `BI_BITFIELDS` compression code, used for 5-6-5 layouts.
pub const BITFIELDS: u32 = 3;

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const MASKS_SIZE: u32 = 12;
const RED_MASK: u32 = 0xF800;
const GREEN_MASK: u32 = 0x07E0;
const BLUE_MASK: u32 = 0x001F;
// 72 DPI
const PIXELS_PER_METER: i32 = 2835;

/// The fields of a BMP header that decoding depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub pixel_offset: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(r: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Bytes per stored row: two bytes per pixel, padded to a multiple of four.
#[inline]
fn row_stride(width: usize) -> usize {
    (width * 2 + 3) & !3
}

/// Parse and validate the header.
///
/// Checks run in a fixed order: magic, dimensions, planes, bit depth,
/// compression. The first failure wins.
pub fn parse_header(data: &[u8]) -> Result<BmpHeader> {
    let mut r = Cursor::new(data);

    let mut magic = [0u8; 2];
    r.read_exact(&mut magic)?;
    if &magic != BMP_MAGIC {
        return Err(ArfError::format("Invalid BMP magic bytes"));
    }

    let file_size = read_u32(&mut r)?;
    // Reserved, application specific
    let _ = read_u32(&mut r)?;
    let pixel_offset = read_u32(&mut r)?;
    // Info header size is not needed, the fields below sit at fixed offsets
    let _ = read_u32(&mut r)?;
    let width = read_i32(&mut r)?;
    let height = read_i32(&mut r)?;

    let shape = FrameShape::new(
        usize::try_from(width).unwrap_or(0),
        usize::try_from(height).unwrap_or(0),
    );
    if !shape.is_panel() {
        return Err(ArfError::Dimensions {
            width: width.into(),
            height: height.into(),
        });
    }

    let planes = read_u16(&mut r)?;
    if planes != 1 {
        return Err(ArfError::format(format!(
            "BMP must have 1 color plane, found {}",
            planes
        )));
    }

    let bits_per_pixel = read_u16(&mut r)?;
    if bits_per_pixel != 16 {
        return Err(ArfError::format(format!(
            "BMP must be 16 bits per pixel, found {}",
            bits_per_pixel
        )));
    }

    let compression = read_u32(&mut r)?;
    if compression != BITFIELDS {
        return Err(ArfError::format(format!(
            "BMP must use RGB565 bit-fields (compression 3), found {}",
            compression
        )));
    }

    Ok(BmpHeader {
        file_size,
        pixel_offset,
        width,
        height,
        planes,
        bits_per_pixel,
        compression,
    })
}

/// Decode a 16-bit RGB565 BMP into a frame.
pub fn decode(data: &[u8]) -> Result<RasterFrame> {
    let header = parse_header(data)?;
    if header.file_size as usize != data.len() {
        warn!(
            "BMP declares {} bytes but buffer holds {}",
            header.file_size,
            data.len()
        );
    }

    // parse_header guarantees positive panel dimensions
    let width = header.width as usize;
    let height = header.height as usize;
    let stride = row_stride(width);
    let offset = header.pixel_offset as usize;

    let needed = offset + stride * (height - 1) + width * 2;
    if data.len() < needed {
        return Err(ArfError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "BMP pixel data truncated: need {} bytes, have {}",
                needed,
                data.len()
            ),
        )));
    }

    let mut pixels = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = offset + row * stride;
        let bytes = &data[start..start + width * 2];
        pixels.extend(
            bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]])),
        );
    }

    RasterFrame::new(width, height, pixels)
}

/// Encode a frame as a 16-bit RGB565 bit-field BMP.
///
/// Any frame shape is written; only panel-sized output decodes again.
pub fn encode(frame: &RasterFrame) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();
    let stride = row_stride(width);
    let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + MASKS_SIZE;
    let image_size = (stride * height) as u32;
    let file_size = pixel_offset + image_size;

    let mut out = Vec::with_capacity(file_size as usize);
    out.extend_from_slice(BMP_MAGIC);
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&pixel_offset.to_le_bytes());

    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(&BITFIELDS.to_le_bytes());
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    // Colors used, colors important
    out.extend_from_slice(&[0u8; 8]);

    out.extend_from_slice(&RED_MASK.to_le_bytes());
    out.extend_from_slice(&GREEN_MASK.to_le_bytes());
    out.extend_from_slice(&BLUE_MASK.to_le_bytes());

    let padding = stride - width * 2;
    for row in frame.pixels().chunks_exact(width) {
        for &px in row {
            out.extend_from_slice(&px.to_le_bytes());
        }
        out.extend(std::iter::repeat_n(0u8, padding));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::frame::{PANEL_HEIGHT, PANEL_WIDTH};
    use crate::raster::Orientation;

    fn gradient(width: usize, height: usize) -> RasterFrame {
        let pixels = (0..width * height).map(|i| (i * 7) as u16).collect();
        RasterFrame::new(width, height, pixels).unwrap()
    }

    fn patch_u16(data: &mut [u8], offset: usize, v: u16) {
        data[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn test_encode_decode_tall() {
        let frame = gradient(PANEL_WIDTH, PANEL_HEIGHT);
        let bytes = encode(&frame);
        assert_eq!(&bytes[..2], b"BM");

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.orientation(), Orientation::Tall);
    }

    #[test]
    fn test_encode_decode_wide() {
        let frame = gradient(PANEL_HEIGHT, PANEL_WIDTH);
        let decoded = decode(&encode(&frame)).unwrap();
        assert_eq!(decoded.orientation(), Orientation::Wide);
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_header_fields() {
        let bytes = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.pixel_offset, 66);
        assert_eq!(header.planes, 1);
        assert_eq!(header.bits_per_pixel, 16);
        assert_eq!(header.compression, BITFIELDS);
        assert_eq!(header.file_size as usize, bytes.len());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(ArfError::Format(_))));
    }

    #[test]
    fn test_unsupported_dimensions() {
        let bytes = encode(&gradient(16, 16));
        assert!(matches!(
            decode(&bytes),
            Err(ArfError::Dimensions {
                width: 16,
                height: 16
            })
        ));
    }

    #[test]
    fn test_negative_height_rejected() {
        let mut bytes = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));
        bytes[22..26].copy_from_slice(&(-(PANEL_HEIGHT as i32)).to_le_bytes());
        assert!(matches!(decode(&bytes), Err(ArfError::Dimensions { .. })));
    }

    #[test]
    fn test_wrong_planes_depth_compression() {
        let good = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));

        let mut planes = good.clone();
        patch_u16(&mut planes, 26, 2);
        assert!(matches!(decode(&planes), Err(ArfError::Format(_))));

        let mut depth = good.clone();
        patch_u16(&mut depth, 28, 24);
        assert!(matches!(decode(&depth), Err(ArfError::Format(_))));

        let mut compression = good;
        patch_u16(&mut compression, 30, 0);
        assert!(matches!(decode(&compression), Err(ArfError::Format(_))));
    }

    #[test]
    fn test_compression_high_bytes_checked() {
        // Low half says bit-fields, high half is not zero
        let mut bytes = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));
        patch_u16(&mut bytes, 32, 1);
        assert!(matches!(decode(&bytes), Err(ArfError::Format(_))));
    }

    #[test]
    fn test_truncated_pixels() {
        let bytes = encode(&gradient(PANEL_WIDTH, PANEL_HEIGHT));
        let cut = &bytes[..bytes.len() - 10];
        match decode(cut) {
            Err(ArfError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(decode(b"BM\x00"), Err(ArfError::Io(_))));
    }

    #[test]
    fn test_row_padding() {
        // 3 pixels = 6 bytes, padded to 8
        let frame = gradient(3, 2);
        let bytes = encode(&frame);
        assert_eq!(bytes.len(), 66 + 16);
    }
}
