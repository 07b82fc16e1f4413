//! RGB565 color packing
//!
//! The display renderer consumes 16-bit colors laid out as 5 bits red,
//! 6 bits green and 5 bits blue. Packing truncates the low bits of each
//! 8-bit channel; there is no rounding or dithering.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// An 8-bit RGB color (alpha is handled separately by the pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Manhattan distance over the three channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprite565::color::Color;
    ///
    /// let white = Color::new(255, 255, 255);
    /// let grey = Color::new(250, 245, 255);
    /// assert_eq!(white.distance(grey), 15);
    /// ```
    pub fn distance(self, other: Color) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, _] = px.0;
        Self { r, g, b }
    }
}

/// A packed RGB565 color value.
///
/// Serializes as a bare `u16`, so `0xF81F` in a TOML config maps directly
/// onto a key candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Pack 8-bit channels by truncating to 5-6-5 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprite565::color::Rgb565;
    ///
    /// assert_eq!(Rgb565::pack(255, 0, 0), Rgb565(0xF800));
    /// assert_eq!(Rgb565::pack(255, 0, 255), Rgb565(0xF81F));
    /// assert_eq!(Rgb565::pack(7, 3, 7), Rgb565(0x0000));
    /// ```
    pub const fn pack(r: u8, g: u8, b: u8) -> Self {
        Self((((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3))
    }

    /// Expand back to 8-bit channels by shifting the stored bits into the
    /// high positions (low bits are zero).
    pub const fn unpack(self) -> Color {
        let v = self.0;
        Color {
            r: ((v >> 11) as u8) << 3,
            g: (((v >> 5) & 0x3F) as u8) << 2,
            b: ((v & 0x1F) as u8) << 3,
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl From<Color> for Rgb565 {
    fn from(c: Color) -> Self {
        Rgb565::pack(c.r, c.g, c.b)
    }
}

impl From<Rgba<u8>> for Rgb565 {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, _] = px.0;
        Rgb565::pack(r, g, b)
    }
}

impl std::fmt::Display for Rgb565 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_primaries() {
        assert_eq!(Rgb565::pack(255, 0, 0).value(), 0xF800);
        assert_eq!(Rgb565::pack(0, 255, 0).value(), 0x07E0);
        assert_eq!(Rgb565::pack(0, 0, 255).value(), 0x001F);
        assert_eq!(Rgb565::pack(255, 255, 255).value(), 0xFFFF);
        assert_eq!(Rgb565::pack(0, 0, 0).value(), 0x0000);
    }

    #[test]
    fn test_unpack_within_truncation_error() {
        // Exhaustive over a coarse lattice plus the channel extremes.
        let samples: Vec<u8> = (0..=255u16).step_by(5).map(|v| v as u8).chain([1, 254, 255]).collect();
        for &r in &samples {
            for &g in &samples {
                for &b in &samples {
                    let back = Rgb565::pack(r, g, b).unpack();
                    assert!(r - back.r <= 7, "red {} -> {}", r, back.r);
                    assert!(g - back.g <= 3, "green {} -> {}", g, back.g);
                    assert!(b - back.b <= 7, "blue {} -> {}", b, back.b);
                }
            }
        }
    }

    #[test]
    fn test_pack_is_deterministic() {
        assert_eq!(Rgb565::pack(123, 45, 67), Rgb565::pack(123, 45, 67));
        assert_eq!(Rgb565::from(Rgba([123, 45, 67, 0])), Rgb565::pack(123, 45, 67));
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        assert_eq!(Rgb565(0xf81f).to_string(), "0xF81F");
        assert_eq!(Rgb565(0x10).to_string(), "0x0010");
    }

    #[test]
    fn test_distance() {
        assert_eq!(Color::new(0, 0, 0).distance(Color::new(255, 255, 255)), 765);
        assert_eq!(Color::new(10, 20, 30).distance(Color::new(10, 20, 30)), 0);
    }
}
