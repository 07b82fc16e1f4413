//! Runners for the build commands (single, characters, folders, build)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{GlobalOptions, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{BuildReport, Pipeline};
use crate::config::loader::{load_config, merge_cli_overrides};

/// Which directory layout a command scans.
#[derive(Debug, Clone, Copy)]
pub enum Adapter {
    Singles,
    Characters,
    Folders,
}

/// Load the config, apply CLI overrides and build the pipeline.
pub fn configure(options: &GlobalOptions) -> Result<Pipeline, ExitCode> {
    let mut config = match load_config(options.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error loading config: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    if let Err(e) = merge_cli_overrides(&mut config, &options.overrides()) {
        tracing::error!("{}", e);
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }

    tracing::debug!("pipeline settings: {:?}", config.pipeline);
    Ok(Pipeline::new(config))
}

fn require_dir(dir: &Path) -> Result<(), ExitCode> {
    if !dir.is_dir() {
        tracing::error!("Directory not found: {}", dir.display());
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(())
}

/// Run one adapter over `dir`.
pub fn run_adapter(
    pipeline: &Pipeline,
    adapter: Adapter,
    dir: &Path,
    out_dir: PathBuf,
) -> Result<BuildReport, ExitCode> {
    require_dir(dir)?;

    let result = match adapter {
        Adapter::Singles => pipeline.build_singles(dir, &out_dir),
        Adapter::Characters => pipeline.build_characters(dir, &out_dir),
        Adapter::Folders => pipeline.build_folders(dir, &out_dir),
    };

    result.map_err(|e| {
        tracing::error!("{}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Run the `build` command over a project root.
pub fn run_project(
    pipeline: &Pipeline,
    root: &Path,
    out_dir: Option<&Path>,
) -> Result<BuildReport, ExitCode> {
    require_dir(root)?;

    pipeline.build_project(root, out_dir).map_err(|e| {
        tracing::error!("{}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Print the report and pick the exit code.
pub fn finish(report: &BuildReport, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                tracing::error!("Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{}", report.summary());
    }

    if report.is_success() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
