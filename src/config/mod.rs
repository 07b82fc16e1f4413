//! Configuration module for sprite565
//!
//! Provides types and parsing for `sprite565.toml` configuration.

pub mod loader;
pub mod schema;

pub use loader::{load_config, merge_cli_overrides, CliOverrides, ConfigError};
pub use schema::*;
