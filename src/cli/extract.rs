//! Extract command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::gif::GifImage;
use crate::output::{frame_output_path, save_frame_png};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the extract command
pub fn run_extract(input: &Path, index: usize, output: Option<&Path>, scale: u8) -> ExitCode {
    let mut image = GifImage::new();
    if let Err(e) = image.decode_file(input) {
        eprintln!("Error: Failed to read '{}': {}", input.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let Some(frame) = image.frame(index) else {
        eprintln!(
            "Error: Frame {} out of range ('{}' has {} frames)",
            index,
            input.display(),
            image.frame_count()
        );
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    let path = frame_output_path(input, index, output);
    if let Err(e) = save_frame_png(frame, &path, scale) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {}", path.display());
    ExitCode::from(EXIT_SUCCESS)
}
