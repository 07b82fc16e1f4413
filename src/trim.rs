//! Canvas trimming to the visible pixel bounds

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// How an image (or a frame group) is cropped before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrimMode {
    /// Keep the canvas as-is
    #[default]
    None,
    /// Crop each image to its own visible bounds
    Single,
    /// Crop every image of a group to the union of their bounds
    Union,
}

impl std::fmt::Display for TrimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrimMode::None => write!(f, "none"),
            TrimMode::Single => write!(f, "single"),
            TrimMode::Union => write!(f, "union"),
        }
    }
}

/// Axis-aligned box with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both.
    pub fn union(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x0={} y0={} x1={} y1={}", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Bounds of all pixels with alpha > 0, or `None` if there are none.
pub fn alpha_bbox(image: &RgbaImage) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for (x, y, px) in image.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        let point = BoundingBox { x0: x, y0: y, x1: x + 1, y1: y + 1 };
        bbox = Some(match bbox {
            Some(b) => b.union(point),
            None => point,
        });
    }
    bbox
}

/// Union of every non-empty box; `None` if all are empty.
pub fn union_bbox<I>(boxes: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = Option<BoundingBox>>,
{
    boxes.into_iter().flatten().reduce(BoundingBox::union)
}

/// Copy out the region covered by `bbox`.
pub fn crop(image: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
    image::imageops::crop_imm(image, bbox.x0, bbox.y0, bbox.width(), bbox.height()).to_image()
}

/// Crop one image to its own visible bounds.
///
/// Returns the image unchanged with `None` when nothing is visible.
pub fn trim_single(image: RgbaImage) -> (RgbaImage, Option<BoundingBox>) {
    match alpha_bbox(&image) {
        Some(bbox) => (crop(&image, bbox), Some(bbox)),
        None => (image, None),
    }
}

/// Crop every image to the union of their visible bounds.
///
/// All images must share one canvas size for the result to be uniform.
/// Returns the applied box, or `None` (images untouched) when no image has
/// a visible pixel.
pub fn trim_union<'a, I>(images: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a mut RgbaImage>,
{
    let mut images: Vec<&mut RgbaImage> = images.into_iter().collect();
    let bbox = union_bbox(images.iter().map(|image| alpha_bbox(image)))?;
    for image in images.iter_mut() {
        let cropped = crop(image, bbox);
        **image = cropped;
    }
    Some(bbox)
}
