//! Image loading
//!
//! Sources may be single-frame (PNG, JPEG, BMP) or multi-frame (GIF, animated
//! WebP/PNG). Only the first frame is used. Everything is normalized to RGBA8;
//! formats without alpha come out fully opaque.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for image loading failures
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be read or decoded
    #[error("failed to decode '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The decoded image has a zero dimension
    #[error("'{}' has an empty canvas ({width}x{height})", path.display())]
    Empty { path: PathBuf, width: u32, height: u32 },
}

/// Load the first frame of an image as RGBA8.
///
/// `image::open` already yields the first frame for GIF and animated WebP
/// sources, so no frame iteration is needed here.
pub fn load_first_frame(path: &Path) -> Result<RgbaImage, DecodeError> {
    let img = image::open(path)
        .map_err(|source| DecodeError::Image { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty { path: path.to_path_buf(), width, height });
    }
    Ok(rgba)
}
