//! Diagnostic output
//!
//! All progress and warning messages go through `tracing` and are written to
//! stderr, so generated headers or `--json` reports on stdout stay clean.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer().with_target(false).without_time().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init();
}
