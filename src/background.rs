//! Background removal for images exported without transparency
//!
//! JPEG/BMP exports and flattened PNGs carry their background as ordinary
//! opaque pixels. The segmenter guesses the background color from fixed
//! sample points on the canvas edge and clears every pixel that is connected
//! to the border through background-colored pixels. Regions of the same color
//! enclosed by the sprite (eye highlights, gaps between limbs that do not
//! touch the edge) are left opaque.

use image::RgbaImage;
use std::collections::VecDeque;

use crate::color::Color;

/// Default Manhattan tolerance for matching the background color.
pub const DEFAULT_TOLERANCE: u32 = 22;

/// Whether any pixel is already fully transparent.
///
/// The segmenter only runs on images for which this is false.
pub fn has_transparent_pixel(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p.0[3] == 0)
}

/// The eight canvas points used to estimate the background: the four
/// corners followed by the four edge midpoints.
fn sample_points(width: u32, height: u32) -> [(u32, u32); 8] {
    let (r, b) = (width - 1, height - 1);
    [
        (0, 0),
        (r, 0),
        (0, b),
        (r, b),
        (width / 2, 0),
        (width / 2, b),
        (0, height / 2),
        (r, height / 2),
    ]
}

/// Estimate the background as the most frequent color among the sample
/// points. Ties go to the color that was sampled first.
///
/// Returns `None` for an empty canvas.
pub fn estimate_background(image: &RgbaImage) -> Option<Color> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let mut counts: Vec<(Color, usize)> = Vec::with_capacity(8);

    for (x, y) in sample_points(width, height) {
        let color = Color::from(*image.get_pixel(x, y));
        match counts.iter_mut().find(|(c, _)| *c == color) {
            Some((_, n)) => *n += 1,
            None => counts.push((color, 1)),
        }
    }

    let mut best = counts[0];
    for &entry in &counts[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    Some(best.0)
}

/// Clear border-connected background pixels by setting their alpha to 0.
///
/// Breadth-first fill seeded from every border pixel, moving through
/// 4-connected neighbours. A pixel counts as background when it is already
/// transparent or lies within `tolerance` (Manhattan RGB distance) of the
/// estimated background color. RGB values are kept; only alpha changes.
///
/// If the fill would reach every pixel of the canvas there is no foreground
/// to separate (a solid-color image), and the image is left untouched.
///
/// Returns the number of pixels that went from visible to transparent.
pub fn remove_background(image: &mut RgbaImage, tolerance: u32) -> usize {
    let Some(bg) = estimate_background(image) else {
        return 0;
    };
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut visited = vec![false; w * h];
    let mut background = Vec::new();
    let mut queue = VecDeque::with_capacity(2 * (w + h));
    for x in 0..w {
        queue.push_back((x, 0));
        queue.push_back((x, h - 1));
    }
    for y in 0..h {
        queue.push_back((0, y));
        queue.push_back((w - 1, y));
    }

    while let Some((x, y)) = queue.pop_front() {
        let idx = y * w + x;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        let px = image.get_pixel(x as u32, y as u32);
        let is_background = px.0[3] == 0 || Color::from(*px).distance(bg) <= tolerance;
        if !is_background {
            continue;
        }
        background.push(idx);

        if x + 1 < w {
            queue.push_back((x + 1, y));
        }
        if x > 0 {
            queue.push_back((x - 1, y));
        }
        if y + 1 < h {
            queue.push_back((x, y + 1));
        }
        if y > 0 {
            queue.push_back((x, y - 1));
        }
    }

    if background.len() == w * h {
        return 0;
    }

    let mut cleared = 0;
    for idx in background {
        let px = image.get_pixel_mut((idx % w) as u32, (idx / w) as u32);
        if px.0[3] != 0 {
            px.0[3] = 0;
            cleared += 1;
        }
    }
    cleared
}
