//! Info command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::gif::GifImage;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the info command
pub fn run_info(input: &Path, json: bool) -> ExitCode {
    let mut image = GifImage::new();
    if let Err(e) = image.decode_file(input) {
        eprintln!("Error: Failed to read '{}': {}", input.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let durations: Vec<f32> = image.frames().iter().map(|f| f.duration()).collect();
    let total: f32 = durations.iter().sum();
    let source_format = image.source_format().map(|f| f.to_string());

    if json {
        let report = serde_json::json!({
            "file": input.display().to_string(),
            "width": image.width(),
            "height": image.height(),
            "frames": image.frame_count(),
            "source_format": source_format,
            "durations": durations,
            "total_duration": total,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{}", input.display());
        println!("  Size:     {}x{}", image.width(), image.height());
        println!("  Frames:   {}", image.frame_count());
        println!("  Format:   {}", source_format.as_deref().unwrap_or("unknown"));
        println!("  Duration: {:.2}s", total);
        for (i, d) in durations.iter().enumerate() {
            println!("    [{}] {:.2}s", i, d);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
