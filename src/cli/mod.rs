//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to the build
//! adapters in [`build`].

mod build;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::trim::TrimMode;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// sprite565 - Compile images into RGB565 PROGMEM headers
#[derive(Parser)]
#[command(name = "sprite565")]
#[command(about = "Compile images into RGB565 PROGMEM headers with chroma-key transparency")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub options: GlobalOptions,
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file (default: sprite565.toml found walking up from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Background match tolerance (Manhattan RGB distance)
    #[arg(long, global = true)]
    pub tolerance: Option<u32>,

    /// Pixels with alpha at or below this value are transparent
    #[arg(long, global = true)]
    pub alpha_threshold: Option<u8>,

    /// Never remove backgrounds from images without transparency
    #[arg(long, global = true)]
    pub keep_background: bool,

    /// Trimming applied to animation frames
    #[arg(long, global = true, value_enum)]
    pub trim_animations: Option<TrimMode>,

    /// Report invalid animation groups and continue instead of aborting
    #[arg(long, global = true)]
    pub skip_bad_groups: bool,

    /// Print the build report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalOptions {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            tolerance: self.tolerance,
            alpha_threshold: self.alpha_threshold,
            keep_background: self.keep_background,
            trim_animations: self.trim_animations,
            skip_bad_groups: self.skip_bad_groups,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// One header per image: <name>.h
    Single {
        /// Directory of images
        dir: PathBuf,

        /// Output directory (default: ./generated_headers)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// One header per character from "<character> <animation> <index>" frames:
    /// <character>_anims_<W>x<H>.h
    Characters {
        /// Directory of frame images
        dir: PathBuf,

        /// Output directory (default: ./generated_headers)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// One header per animation folder holding all of its characters: <folder>.h
    Folders {
        /// Directory whose subfolders each hold one animation group
        dir: PathBuf,

        /// Output directory (default: ./generated_headers)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a project root: ROOT/single and ROOT/anims
    Build {
        /// Project root
        root: PathBuf,

        /// Output directory (default: ROOT/generated_headers)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logger::init(cli.options.verbose);

    let pipeline = match build::configure(&cli.options) {
        Ok(pipeline) => pipeline,
        Err(code) => return code,
    };

    let default_out = || PathBuf::from(crate::build::OUT_DIR_NAME);
    let result = match cli.command {
        Commands::Single { dir, output } => {
            build::run_adapter(&pipeline, build::Adapter::Singles, &dir, output.unwrap_or_else(default_out))
        }
        Commands::Characters { dir, output } => build::run_adapter(
            &pipeline,
            build::Adapter::Characters,
            &dir,
            output.unwrap_or_else(default_out),
        ),
        Commands::Folders { dir, output } => {
            build::run_adapter(&pipeline, build::Adapter::Folders, &dir, output.unwrap_or_else(default_out))
        }
        Commands::Build { root, output } => build::run_project(&pipeline, &root, output.as_deref()),
    };

    match result {
        Ok(report) => build::finish(&report, cli.options.json),
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sprite565",
            "folders",
            "anims",
            "--tolerance",
            "30",
            "--trim-animations",
            "union",
            "--skip-bad-groups",
            "--json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Folders { .. }));
        let overrides = cli.options.overrides();
        assert_eq!(overrides.tolerance, Some(30));
        assert_eq!(overrides.trim_animations, Some(TrimMode::Union));
        assert!(overrides.skip_bad_groups);
        assert!(!overrides.keep_background);
        assert!(cli.options.json);
    }

    #[test]
    fn test_output_flag() {
        let cli = Cli::try_parse_from(["sprite565", "build", "sprites", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Build { root, output } => {
                assert_eq!(root, PathBuf::from("sprites"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_rejects_bad_alpha_threshold() {
        assert!(Cli::try_parse_from(["sprite565", "single", "img", "--alpha-threshold", "300"]).is_err());
    }
}
