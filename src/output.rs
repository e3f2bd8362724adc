//! PNG import/export of single frames and output path generation

use image::imageops::FilterType;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frame::{Frame, FrameError};

/// Error type for output operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding or decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Decoded image could not become a frame
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Save one frame as PNG, scaled by an integer factor.
pub fn save_frame_png(frame: &Frame, path: &Path, scale: u8) -> Result<(), OutputError> {
    save_png(&scale_image(frame.to_rgba_image(), scale), path)
}

/// Load any image the `image` crate understands as a single frame.
pub fn load_frame(path: &Path, duration: f32) -> Result<Frame, OutputError> {
    let image = image::open(path)?.to_rgba8();
    Ok(Frame::from_rgba_image(&image, duration)?)
}

/// Scale image by integer factor using nearest-neighbor interpolation.
pub fn scale_image(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor as u32, h * factor as u32, FilterType::Nearest)
}

/// Output path for an extracted frame.
///
/// | `-o` | Output |
/// |------|--------|
/// | none | `{input stem}_frame{index}.png` next to the input |
/// | `dir/` (existing directory or trailing slash) | `dir/{input stem}_frame{index}.png` |
/// | `out.png` | `out.png` |
pub fn frame_output_path(input: &Path, index: usize, output_arg: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let file_name = format!("{}_frame{}.png", stem, index);

    match output_arg {
        Some(out) if is_directory_arg(out) => out.join(file_name),
        Some(out) => out.to_path_buf(),
        None => input.parent().unwrap_or(Path::new("")).join(file_name),
    }
}

fn is_directory_arg(path: &Path) -> bool {
    path.is_dir() || path.to_string_lossy().ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("frame.png");
        // Bottom row red, top row blue
        let pixels = [[255, 0, 0, 255], [0, 0, 255, 255]].concat();
        let frame = Frame::new(1, 2, pixels, 0.5).unwrap();

        save_frame_png(&frame, &path, 1).unwrap();
        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);

        let loaded = load_frame(&path, 0.5).unwrap();
        assert_eq!(loaded, frame);
    }

    #[test]
    fn test_scale_image() {
        let image = RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 4]));
        let scaled = scale_image(image.clone(), 4);
        assert_eq!(scaled.dimensions(), (8, 12));
        assert_eq!(scale_image(image, 1).dimensions(), (2, 3));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_frame(&dir.path().join("nope.png"), 0.1),
            Err(OutputError::Image(_))
        ));
    }

    #[test]
    fn test_error_display_and_source() {
        use std::error::Error as _;
        let err = OutputError::from(FrameError::Empty(0, 3));
        assert_eq!(err.to_string(), "Frame error: frame dimensions must be non-zero, got 0x3");
        assert!(err.source().is_some());

        let io = OutputError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(io, OutputError::Io(_)));
    }

    #[test]
    fn test_frame_output_path() {
        let input = Path::new("anims/walk.gif");
        assert_eq!(frame_output_path(input, 3, None), PathBuf::from("anims/walk_frame3.png"));
        assert_eq!(
            frame_output_path(input, 0, Some(Path::new("out/"))),
            PathBuf::from("out/walk_frame0.png")
        );
        assert_eq!(
            frame_output_path(input, 0, Some(Path::new("first.png"))),
            PathBuf::from("first.png")
        );
    }
}
