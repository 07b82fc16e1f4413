//! Configuration loading and discovery for `sprite565.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::Sprite565Config;
use crate::trim::TrimMode;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "sprite565.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse sprite565.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tolerance: Option<u32>,
    pub alpha_threshold: Option<u8>,
    /// Disable background removal
    pub keep_background: bool,
    pub trim_animations: Option<TrimMode>,
    /// Isolate invalid groups instead of aborting
    pub skip_bad_groups: bool,
}

/// Find sprite565.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find sprite565.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a sprite565.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
pub fn load_config(path: Option<&Path>) -> Result<Sprite565Config, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(Sprite565Config::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<Sprite565Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: Sprite565Config = toml::from_str(&contents)?;
    check(&config)?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn check(config: &Sprite565Config) -> Result<(), ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged
/// configuration is validated again.
pub fn merge_cli_overrides(
    config: &mut Sprite565Config,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(tolerance) = overrides.tolerance {
        config.pipeline.background_tolerance = tolerance;
    }
    if let Some(threshold) = overrides.alpha_threshold {
        config.pipeline.alpha_threshold = threshold;
    }
    if overrides.keep_background {
        config.pipeline.auto_remove_background = false;
    }
    if let Some(mode) = overrides.trim_animations {
        config.pipeline.trim_animations = mode;
    }
    if overrides.skip_bad_groups {
        config.pipeline.on_size_mismatch = super::SizeMismatchPolicy::SkipGroup;
    }
    check(config)
}
