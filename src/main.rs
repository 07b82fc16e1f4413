//! sprite565 - Command-line tool for compiling images into RGB565 PROGMEM headers

use std::process::ExitCode;

use sprite565::cli;

fn main() -> ExitCode {
    cli::run()
}
