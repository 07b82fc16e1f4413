//! Configuration schema types for `sprite565.toml`
//!
//! Every tunable constant of the pipeline lives here and is passed
//! explicitly into [`crate::build::Pipeline`].

use serde::{Deserialize, Serialize};

use crate::animation::DuplicateIndices;
use crate::background::DEFAULT_TOLERANCE;
use crate::color::Rgb565;
use crate::emit::DEFAULT_VALUES_PER_LINE;
use crate::key::DEFAULT_KEY_CANDIDATES;
use crate::trim::TrimMode;

/// What a frame-size mismatch inside a group does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SizeMismatchPolicy {
    /// Stop the whole run at the first invalid group
    #[default]
    Abort,
    /// Drop the invalid character, report it, keep going
    SkipGroup,
}

/// Pixel pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Manhattan RGB distance under which a pixel matches the estimated
    /// background. Higher removes more.
    pub background_tolerance: u32,
    /// Pixels with alpha at or below this value are transparent: they
    /// encode as the key and are ignored when choosing it.
    pub alpha_threshold: u8,
    /// Run background removal on images without any fully transparent pixel
    pub auto_remove_background: bool,
    /// Key candidates, tried in order
    pub key_candidates: Vec<Rgb565>,
    /// Trimming for single images (`none` or `single`)
    pub trim_single: TrimMode,
    /// Trimming for animation groups (`none`, `single` or `union`)
    pub trim_animations: TrimMode,
    pub on_size_mismatch: SizeMismatchPolicy,
    pub duplicate_indices: DuplicateIndices,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            background_tolerance: DEFAULT_TOLERANCE,
            alpha_threshold: 0,
            auto_remove_background: true,
            key_candidates: DEFAULT_KEY_CANDIDATES.to_vec(),
            trim_single: TrimMode::Single,
            trim_animations: TrimMode::None,
            on_size_mismatch: SizeMismatchPolicy::Abort,
            duplicate_indices: DuplicateIndices::Keep,
        }
    }
}

/// Generated header layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pixel values per table line
    pub values_per_line: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { values_per_line: DEFAULT_VALUES_PER_LINE }
    }
}

/// Complete sprite565.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprite565Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "pipeline.key_candidates")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sprite565.toml: '{}' {}", self.field, self.message)
    }
}

impl Sprite565Config {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.pipeline.key_candidates.is_empty() {
            errors.push(ConfigValidationError {
                field: "pipeline.key_candidates".to_string(),
                message: "must contain at least one color".to_string(),
            });
        }

        if self.pipeline.trim_single == TrimMode::Union {
            errors.push(ConfigValidationError {
                field: "pipeline.trim_single".to_string(),
                message: "must be \"none\" or \"single\"".to_string(),
            });
        }

        if self.output.values_per_line == 0 {
            errors.push(ConfigValidationError {
                field: "output.values_per_line".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }
}
