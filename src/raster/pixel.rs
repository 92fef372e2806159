//! RGB565 pixel packing.
//!
//! Panels driven by ARF streams take 16-bit colors laid out as
//! `rrrrrggggggbbbbb` (5 bits red, 6 bits green, 5 bits blue).

/// Maximum value of the red and blue fields.
pub const MAX_5BIT: u8 = 0x1F;

/// Maximum value of the green field.
pub const MAX_6BIT: u8 = 0x3F;

/// Pack a 5-6-5 triple into a 16-bit color.
///
/// Components are masked to their field width, so an out-of-range red value
/// cannot bleed into the green bits.
#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r & MAX_5BIT) << 11) | (u16::from(g & MAX_6BIT) << 5) | u16::from(b & MAX_5BIT)
}

/// Split a 16-bit color into its (r, g, b) fields.
#[inline]
pub fn unpack(color: u16) -> (u8, u8, u8) {
    (
        ((color >> 11) & 0x1F) as u8,
        ((color >> 5) & 0x3F) as u8,
        (color & 0x1F) as u8,
    )
}

/// A packed RGB565 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb565(pack(r, g, b))
    }

    /// Quantize an 8-bit-per-channel color by truncating the low bits.
    pub fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Rgb565(pack(r >> 3, g >> 2, b >> 3))
    }

    /// Expand to 8 bits per channel, replicating high bits into the low ones.
    pub fn to_rgb888(self) -> (u8, u8, u8) {
        let (r, g, b) = unpack(self.0);
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }

    pub fn red(self) -> u8 {
        unpack(self.0).0
    }

    pub fn green(self) -> u8 {
        unpack(self.0).1
    }

    pub fn blue(self) -> u8 {
        unpack(self.0).2
    }
}

impl From<u16> for Rgb565 {
    fn from(v: u16) -> Self {
        Rgb565(v)
    }
}

impl From<Rgb565> for u16 {
    fn from(c: Rgb565) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack(0x1F, 0, 0), 0xF800);
        assert_eq!(pack(0, 0x3F, 0), 0x07E0);
        assert_eq!(pack(0, 0, 0x1F), 0x001F);
        assert_eq!(pack(0x1F, 0x3F, 0x1F), 0xFFFF);
    }

    #[test]
    fn test_pack_masks_overflow() {
        // 32 does not fit in 5 bits and must not touch the green field
        assert_eq!(pack(32, 0, 0), 0);
        assert_eq!(pack(0, 64, 0), 0);
        assert_eq!(pack(0, 0, 33), 1);
    }

    #[test]
    fn test_rgb888_extremes() {
        assert_eq!(Rgb565::from_rgb888(255, 255, 255), Rgb565::WHITE);
        assert_eq!(Rgb565::from_rgb888(0, 0, 0), Rgb565::BLACK);
        assert_eq!(Rgb565::WHITE.to_rgb888(), (255, 255, 255));
        assert_eq!(Rgb565::BLACK.to_rgb888(), (0, 0, 0));
    }

    #[test]
    fn test_channel_accessors() {
        let c = Rgb565::new(3, 40, 17);
        assert_eq!((c.red(), c.green(), c.blue()), (3, 40, 17));
        assert_eq!(u16::from(c), pack(3, 40, 17));
    }

    #[test]
    fn test_roundtrip_exhaustive() {
        for r in 0..=MAX_5BIT {
            for g in 0..=MAX_6BIT {
                for b in 0..=MAX_5BIT {
                    assert_eq!(unpack(pack(r, g, b)), (r, g, b));
                }
            }
        }
    }

    proptest! {
        #[test]
        fn test_unpack_pack_identity(color in any::<u16>()) {
            let (r, g, b) = unpack(color);
            prop_assert_eq!(pack(r, g, b), color);
        }
    }
}
