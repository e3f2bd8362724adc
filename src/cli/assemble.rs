//! Assemble command implementation

use glob::glob;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::frame::Frame;
use crate::gif::GifImage;
use crate::output::load_frame;

use super::{resolve_encode_config, EncodeArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Display time given to each still before any `--duration` override
const DEFAULT_FRAME_SECONDS: f32 = 0.1;

/// Expand glob patterns in argument order. Arguments without glob
/// metacharacters are kept as literal paths.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let matches = glob(input).map_err(|e| format!("Invalid pattern '{}': {}", input, e))?;
        let before = paths.len();
        paths.extend(matches.filter_map(Result::ok));
        if paths.len() == before {
            return Err(format!("Pattern '{}' matched no files", input));
        }
    }
    Ok(paths)
}

/// Execute the assemble command
pub fn run_assemble(inputs: &[String], output: &Path, args: &EncodeArgs) -> ExitCode {
    let config = match resolve_encode_config(args) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let paths = match expand_inputs(inputs) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut frames: Vec<Frame> = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_frame(path, DEFAULT_FRAME_SECONDS) {
            Ok(frame) => frames.push(frame),
            Err(e) => {
                eprintln!("Error: Failed to read '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let image = match GifImage::from_frames(frames) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Err(e) = image.encode_file(output, &config) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Wrote {} ({} frames)", output.display(), image.frame_count());
    ExitCode::from(EXIT_SUCCESS)
}
