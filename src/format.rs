//! Pixel formats and the image-format capability set
//!
//! Each container format implements [`ImageCodec`] independently. GIF is
//! the only one provided here; [`ImageFormat`] is the tagged value used to
//! pick an implementation from a path or a byte header.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::frame::Frame;

/// In-memory or on-disk pixel representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "bits")]
pub enum PixelFormat {
    /// Palette indices of the given bit depth
    Indexed(u8),
    /// 8-bit-per-channel RGBA
    Rgba8,
}

impl PixelFormat {
    /// Bits per pixel
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            PixelFormat::Indexed(bits) => bits,
            PixelFormat::Rgba8 => 32,
        }
    }

    pub fn is_indexed(self) -> bool {
        matches!(self, PixelFormat::Indexed(_))
    }

    /// Number of palette entries, for indexed formats.
    pub fn palette_size(self) -> Option<usize> {
        match self {
            PixelFormat::Indexed(bits) if bits <= 8 => Some(1usize << bits),
            _ => None,
        }
    }

    /// Smallest indexed format able to address `entries` colours (clamped to 1..=8 bits).
    pub fn indexed_for_entries(entries: usize) -> Self {
        let mut bits = 1u8;
        while bits < 8 && (1usize << bits) < entries {
            bits += 1;
        }
        PixelFormat::Indexed(bits)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Indexed(bits) => write!(f, "indexed {}-bit", bits),
            PixelFormat::Rgba8 => write!(f, "rgba8"),
        }
    }
}

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
}

impl ImageFormat {
    /// Guess from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Identify from the leading bytes of a stream.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Gif => "gif",
        }
    }
}

/// Capability set shared by every image format.
///
/// Decoding and encoding report success as `bool`; implementations expose
/// richer `Result` APIs alongside for callers that need the cause.
pub trait ImageCodec {
    /// Format-specific encode parameters
    type Options;

    fn format(&self) -> ImageFormat;

    /// Replace the contents with the decoded stream.
    fn decode(&mut self, bytes: &[u8]) -> bool;

    /// Write the contents to `path`.
    fn encode(&self, path: &Path, options: &Self::Options) -> bool;

    /// Replace the contents with externally supplied frames.
    fn set_frames(&mut self, frames: Vec<Frame>) -> bool;

    fn frame(&self, index: usize) -> Option<&Frame>;

    fn frame_count(&self) -> usize;

    fn clear(&mut self);

    /// True iff at least one frame is present.
    fn is_valid(&self) -> bool {
        self.frame_count() > 0
    }
}
