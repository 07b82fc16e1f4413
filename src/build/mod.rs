//! Build module for sprite565
//!
//! Turns directories of images into generated headers.
//!
//! # Overview
//!
//! - **Discovery**: list source images and animation folders
//! - **Pipeline**: decode, segment, trim, pick a key, encode and emit
//! - **Result**: per-artifact outcome collected into a [`BuildReport`]
//!
//! # Example
//!
//! ```no_run
//! use sprite565::build::Pipeline;
//! use sprite565::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(None)?;
//! let pipeline = Pipeline::new(config);
//!
//! let report = pipeline.build_project(Path::new("sprites"), None)?;
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod discovery;
pub mod pipeline;
pub mod result;

pub use discovery::*;
pub use pipeline::*;
pub use result::*;
