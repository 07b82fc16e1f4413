//! RGBA to RGB565 pixel table encoding

use image::RgbaImage;

use crate::color::Rgb565;
use crate::key::ColorKey;

/// A row-major RGB565 pixel table for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb565>,
    /// Some opaque pixel packed to the key value and will be drawn as
    /// transparent.
    pub collision: bool,
}

/// Encode an image against a transparency key.
///
/// Pixels with alpha at or below `alpha_threshold` become the key; all
/// others are packed to RGB565.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use sprite565::color::Rgb565;
/// use sprite565::encode::encode_image;
/// use sprite565::key::ColorKey;
///
/// let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
/// img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
///
/// let key = ColorKey { value: Rgb565(0xF81F), collision: false };
/// let encoded = encode_image(&img, key, 0);
/// assert_eq!(encoded.pixels, vec![Rgb565(0xF800), Rgb565(0xF81F)]);
/// assert!(!encoded.collision);
/// ```
pub fn encode_image(image: &RgbaImage, key: ColorKey, alpha_threshold: u8) -> EncodedImage {
    let (width, height) = image.dimensions();
    let mut pixels = Vec::with_capacity((width * height) as usize);
    let mut collision = false;

    for px in image.pixels() {
        if px.0[3] <= alpha_threshold {
            pixels.push(key.value);
            continue;
        }
        let packed = Rgb565::from(*px);
        if packed == key.value {
            collision = true;
        }
        pixels.push(packed);
    }

    EncodedImage { width, height, pixels, collision }
}
