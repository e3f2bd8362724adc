//! Recode command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::gif::GifImage;

use super::{resolve_encode_config, EncodeArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the recode command
pub fn run_recode(input: &Path, output: &Path, args: &EncodeArgs) -> ExitCode {
    let config = match resolve_encode_config(args) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mut image = GifImage::new();
    if let Err(e) = image.decode_file(input) {
        eprintln!("Error: Failed to read '{}': {}", input.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    if let Err(e) = image.encode_file(output, &config) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Wrote {} ({} frames, {}x{}, {})",
        output.display(),
        image.frame_count(),
        image.width(),
        image.height(),
        config.format
    );
    ExitCode::from(EXIT_SUCCESS)
}
