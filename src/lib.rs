//! sprite565 - Library for compiling raster images into RGB565 PROGMEM headers
//!
//! This library provides functionality to:
//! - Decode images and remove flat backgrounds from sources without alpha
//! - Trim canvases to their visible pixels, per image or per animation
//! - Choose a transparency key that no opaque pixel uses
//! - Encode pixels as RGB565 and emit C/C++ headers for Arduino targets
//! - Group `<character> <animation> <index>` frame files into animations

pub mod animation;
pub mod background;
pub mod build;
pub mod cli;
pub mod color;
pub mod config;
pub mod decode;
pub mod emit;
pub mod encode;
pub mod key;
pub mod logger;
pub mod trim;
