//! Transparency key selection
//!
//! The renderer skips every pixel equal to the key color, so the key must
//! not appear among the opaque pixels of any image drawn with it. One key
//! is chosen for a whole group of images (all frames of a character or an
//! animation folder) so the firmware can keep a single constant.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::color::Rgb565;

/// Search order for key candidates: magenta, green, blue, yellow, cyan,
/// red, dark blue.
pub const DEFAULT_KEY_CANDIDATES: [Rgb565; 7] = [
    Rgb565(0xF81F),
    Rgb565(0x07E0),
    Rgb565(0x001F),
    Rgb565(0xFFE0),
    Rgb565(0x07FF),
    Rgb565(0xF800),
    Rgb565(0x0010),
];

/// A chosen transparency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorKey {
    pub value: Rgb565,
    /// Every candidate was used by some opaque pixel; `value` is the first
    /// candidate and some pixels will render as transparent.
    pub collision: bool,
}

/// Packed colors of every pixel whose alpha is above `alpha_threshold`.
pub fn opaque_colors<'a, I>(images: I, alpha_threshold: u8) -> HashSet<Rgb565>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    let mut colors = HashSet::new();
    for image in images {
        colors.extend(image.pixels().filter(|p| p.0[3] > alpha_threshold).map(|p| Rgb565::from(*p)));
    }
    colors
}

/// Pick the first candidate not used by any opaque pixel of `images`.
///
/// Falls back to the first candidate with `collision = true` when every
/// candidate is taken. `candidates` must not be empty; the config layer
/// rejects empty lists.
pub fn select_key<'a, I>(images: I, candidates: &[Rgb565], alpha_threshold: u8) -> ColorKey
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    let used = opaque_colors(images, alpha_threshold);
    let fallback = candidates.first().copied().unwrap_or(DEFAULT_KEY_CANDIDATES[0]);

    match candidates.iter().find(|c| !used.contains(*c)) {
        Some(&value) => ColorKey { value, collision: false },
        None => ColorKey { value: fallback, collision: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, Rgba([r, g, b, 255]))
    }

    /// One pixel per candidate color, unpacked back to 8-bit channels.
    fn all_candidates_image() -> RgbaImage {
        let mut img = RgbaImage::new(DEFAULT_KEY_CANDIDATES.len() as u32, 1);
        for (i, c) in DEFAULT_KEY_CANDIDATES.iter().enumerate() {
            let rgb = c.unpack();
            img.put_pixel(i as u32, 0, Rgba([rgb.r, rgb.g, rgb.b, 255]));
        }
        img
    }

    #[test]
    fn test_red_image_takes_first_candidate() {
        let key = select_key([&solid(255, 0, 0)], &DEFAULT_KEY_CANDIDATES, 0);
        assert_eq!(key, ColorKey { value: Rgb565(0xF81F), collision: false });
    }

    #[test]
    fn test_skips_used_candidates() {
        let magenta = solid(255, 0, 255);
        let green = solid(0, 255, 0);
        let key = select_key([&magenta, &green], &DEFAULT_KEY_CANDIDATES, 0);
        assert_eq!(key, ColorKey { value: Rgb565(0x001F), collision: false });
    }

    #[test]
    fn test_truncation_counts_as_collision() {
        // (250, 3, 251) packs to 0xF81F.
        let key = select_key([&solid(250, 3, 251)], &DEFAULT_KEY_CANDIDATES, 0);
        assert_eq!(key.value, Rgb565(0x07E0));
    }

    #[test]
    fn test_transparent_pixels_are_ignored() {
        let mut img = solid(255, 0, 255);
        for p in img.pixels_mut() {
            p.0[3] = 0;
        }
        let key = select_key([&img], &DEFAULT_KEY_CANDIDATES, 0);
        assert_eq!(key.value, Rgb565(0xF81F));

        // With a threshold, faint pixels are ignored too.
        let mut faint = solid(255, 0, 255);
        for p in faint.pixels_mut() {
            p.0[3] = 40;
        }
        assert_eq!(select_key([&faint], &DEFAULT_KEY_CANDIDATES, 0).value, Rgb565(0x07E0));
        assert_eq!(select_key([&faint], &DEFAULT_KEY_CANDIDATES, 40).value, Rgb565(0xF81F));
    }

    #[test]
    fn test_exhausted_candidates_fall_back_to_first() {
        let img = all_candidates_image();
        let key = select_key([&img], &DEFAULT_KEY_CANDIDATES, 0);
        assert_eq!(key, ColorKey { value: Rgb565(0xF81F), collision: true });
    }

    #[test]
    fn test_selection_is_deterministic() {
        let images = vec![solid(255, 0, 255), solid(12, 200, 7), all_candidates_image()];
        let first = select_key(&images, &DEFAULT_KEY_CANDIDATES, 0);
        for _ in 0..5 {
            assert_eq!(select_key(&images, &DEFAULT_KEY_CANDIDATES, 0), first);
        }
    }

    #[test]
    fn test_custom_candidate_order() {
        let candidates = [Rgb565(0x0010), Rgb565(0xF81F)];
        assert_eq!(select_key([&solid(0, 0, 0)], &candidates, 0).value, Rgb565(0x0010));
    }
}
