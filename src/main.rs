//! gifanim - Command-line tool for inspecting and re-encoding animated GIFs

use std::process::ExitCode;

use gifanim::cli;

fn main() -> ExitCode {
    cli::run()
}
