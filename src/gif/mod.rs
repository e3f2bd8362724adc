//! Animated GIF codec
//!
//! [`GifImage`] owns a [`FrameStore`] of fully composited frames. Loading
//! composites every sub-image according to its disposal method and
//! interlacing; saving quantizes each frame and writes a palette stream.
//!
//! Load and save report success as `bool` and log the cause on failure.
//! The `decode_*`/`encode_*` methods return the [`GifError`] instead.
//!
//! ```no_run
//! use gifanim::gif::{EncodeConfig, GifImage};
//!
//! let mut image = GifImage::new();
//! if image.load_file("input.gif") {
//!     println!("{} frames at {}x{}", image.frame_count(), image.width(), image.height());
//!     image.save("output.gif", &EncodeConfig::with_bits(6));
//! }
//! ```

pub mod decode;
pub mod encode;
mod error;
mod options;
pub mod record;
pub mod stream;

pub use error::GifError;
pub use options::{AlphaThreshold, EncodeConfig};

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use crate::format::{ImageCodec, ImageFormat, PixelFormat};
use crate::frame::Frame;
use crate::quantize::{PaletteQuantizer, Quantizer};
use crate::store::FrameStore;

/// A GIF image as a sequence of composited RGBA frames.
///
/// Not synchronised: steal and mutation calls from different threads on
/// the same image need external locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GifImage {
    store: FrameStore,
    source_format: Option<PixelFormat>,
}

impl GifImage {
    /// An empty, invalid image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a file; the result is invalid if decoding failed.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let mut image = Self::new();
        image.load_file(path);
        image
    }

    /// Decode an in-memory stream; the result is invalid if decoding failed.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut image = Self::new();
        image.load_bytes(bytes);
        image
    }

    /// Take ownership of `frames`, which must share one size.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self, GifError> {
        let mut image = Self::new();
        image.replace_frames(frames)?;
        Ok(image)
    }

    /// Deep-copy `frames`, which must share one size.
    pub fn from_frames_copied(frames: &[Frame]) -> Result<Self, GifError> {
        Self::from_frames(frames.to_vec())
    }

    /// Single-frame image.
    pub fn from_frame(frame: Frame) -> Self {
        let mut store = FrameStore::new();
        store.push(frame);
        Self { store, source_format: None }
    }

    /// Single-frame image from a bottom-up RGBA8 buffer.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        duration: f32,
    ) -> Result<Self, GifError> {
        Ok(Self::from_frame(Frame::new(width, height, pixels, duration)?))
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Replace the contents with the decoded file. Returns false on failure,
    /// leaving the image empty.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.decode_file(path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to load {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Replace the contents with the decoded buffer. Returns false on
    /// failure, leaving the image empty.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> bool {
        match self.decode_bytes(bytes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to load GIF buffer ({} bytes): {}", bytes.len(), e);
                false
            }
        }
    }

    pub fn decode_file(&mut self, path: impl AsRef<Path>) -> Result<(), GifError> {
        self.clear();
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        check_signature(&mut reader)?;
        self.install(decode::decode(reader)?);
        log::info!("loaded {} ({} frames)", path.display(), self.frame_count());
        Ok(())
    }

    pub fn decode_bytes(&mut self, bytes: &[u8]) -> Result<(), GifError> {
        self.clear();
        if ImageFormat::sniff(bytes) != Some(ImageFormat::Gif) {
            return Err(GifError::NotGif);
        }
        self.install(decode::decode(bytes)?);
        Ok(())
    }

    fn install(&mut self, decoded: decode::Decoded) {
        self.store.set_dimensions(decoded.width, decoded.height);
        for frame in decoded.frames {
            self.store.push(frame);
        }
        self.source_format = Some(decoded.source_format);
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Encode to `path`. Returns false on failure; the destination is only
    /// written once the whole stream has been produced.
    pub fn save(&self, path: impl AsRef<Path>, config: &EncodeConfig) -> bool {
        let path = path.as_ref();
        match self.encode_file(path, config) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to save {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn encode_file(&self, path: impl AsRef<Path>, config: &EncodeConfig) -> Result<(), GifError> {
        let path = path.as_ref();
        let bytes = self.encode_to_vec(config)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &bytes)?;
        log::info!("saved {} ({} frames, {} bytes)", path.display(), self.frame_count(), bytes.len());
        Ok(())
    }

    /// Encode with the built-in quantizer.
    pub fn encode_to_vec(&self, config: &EncodeConfig) -> Result<Vec<u8>, GifError> {
        self.encode_with(config, &PaletteQuantizer)
    }

    /// Encode with a caller-supplied quantizer.
    pub fn encode_with<Q: Quantizer + ?Sized>(
        &self,
        config: &EncodeConfig,
        quantizer: &Q,
    ) -> Result<Vec<u8>, GifError> {
        encode::validate(config)?;
        let mut bytes = Vec::new();
        encode::encode(self.store.as_slice(), config, quantizer, &mut bytes)?;
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // Frame access
    // ------------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.store.width()
    }

    pub fn height(&self) -> u32 {
        self.store.height()
    }

    pub fn frame_count(&self) -> usize {
        self.store.len()
    }

    /// True iff at least one frame is present.
    pub fn is_valid(&self) -> bool {
        !self.store.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.store.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        self.store.as_slice()
    }

    /// Remove one frame, transferring ownership to the caller.
    pub fn steal_frame(&mut self, index: usize) -> Option<Frame> {
        self.store.steal(index)
    }

    /// Move all frames into `dest`, leaving the image empty.
    pub fn steal_frames(&mut self, dest: &mut Vec<Frame>) {
        self.store.steal_all(dest);
    }

    /// Index format of the decoded source, `None` for images built in memory.
    pub fn source_format(&self) -> Option<PixelFormat> {
        self.source_format
    }

    /// In-memory representation, always RGBA8.
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    /// Drop all frames and reset dimensions.
    pub fn clear(&mut self) {
        self.store.clear();
        self.source_format = None;
    }

    fn replace_frames(&mut self, frames: Vec<Frame>) -> Result<(), GifError> {
        if let Some(first) = frames.first() {
            let expected = (first.width(), first.height());
            if let Some((index, frame)) = frames
                .iter()
                .enumerate()
                .find(|(_, f)| (f.width(), f.height()) != expected)
            {
                return Err(GifError::DimensionMismatch {
                    index,
                    actual: (frame.width(), frame.height()),
                    expected,
                });
            }
        }
        self.clear();
        for frame in frames {
            self.store.push(frame);
        }
        Ok(())
    }
}

/// Peek at the signature without consuming it.
fn check_signature(reader: &mut BufReader<File>) -> Result<(), GifError> {
    use std::io::BufRead;
    let head = reader.fill_buf()?;
    if ImageFormat::sniff(head) == Some(ImageFormat::Gif) {
        Ok(())
    } else {
        Err(GifError::NotGif)
    }
}

impl ImageCodec for GifImage {
    type Options = EncodeConfig;

    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn decode(&mut self, bytes: &[u8]) -> bool {
        self.load_bytes(bytes)
    }

    fn encode(&self, path: &Path, options: &EncodeConfig) -> bool {
        self.save(path, options)
    }

    fn set_frames(&mut self, frames: Vec<Frame>) -> bool {
        match self.replace_frames(frames) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("rejected frames: {}", e);
                false
            }
        }
    }

    fn frame(&self, index: usize) -> Option<&Frame> {
        self.store.get(index)
    }

    fn frame_count(&self) -> usize {
        self.store.len()
    }

    fn clear(&mut self) {
        GifImage::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Frame {
        let pixels = (0..w * h).flat_map(|_| rgba).collect();
        Frame::new(w, h, pixels, 0.1).unwrap()
    }

    #[test]
    fn test_new_is_invalid() {
        let image = GifImage::new();
        assert!(!image.is_valid());
        assert_eq!(image.frame_count(), 0);
        assert_eq!((image.width(), image.height()), (0, 0));
        assert_eq!(image.source_format(), None);
        assert_eq!(image.pixel_format(), PixelFormat::Rgba8);
    }

    #[test]
    fn test_from_frames_rejects_mixed_sizes() {
        let result = GifImage::from_frames(vec![solid(2, 2, [0; 4]), solid(3, 2, [0; 4])]);
        assert!(matches!(result, Err(GifError::DimensionMismatch { index: 1, .. })));
    }

    #[test]
    fn test_from_frames_copied_leaves_source() {
        let frames = vec![solid(2, 2, [1, 2, 3, 255]), solid(2, 2, [4, 5, 6, 255])];
        let image = GifImage::from_frames_copied(&frames).unwrap();
        assert_eq!(image.frame_count(), 2);
        assert_eq!(image.frames(), frames.as_slice());
        assert_ne!(image.frame(0).unwrap().pixels().as_ptr(), frames[0].pixels().as_ptr());
    }

    #[test]
    fn test_from_pixels() {
        let image = GifImage::from_pixels(1, 2, vec![9; 8], 0.25).unwrap();
        assert_eq!((image.width(), image.height()), (1, 2));
        assert_eq!(image.frame(0).unwrap().duration(), 0.25);
        assert!(GifImage::from_pixels(1, 2, vec![9; 7], 0.25).is_err());
    }

    #[test]
    fn test_load_garbage_fails_and_clears() {
        let mut image = GifImage::from_frame(solid(2, 2, [0; 4]));
        assert!(!image.load_bytes(b"PNG?"));
        assert!(!image.is_valid());
        assert_eq!((image.width(), image.height()), (0, 0));
        assert!(!image.load_bytes(&[]));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let mut image = GifImage::new();
        assert!(!image.load_file(dir.path().join("missing.gif")));
        assert!(!image.is_valid());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.gif");
        let image = GifImage::from_frames(vec![
            solid(3, 2, [255, 0, 0, 255]),
            solid(3, 2, [0, 255, 0, 255]),
        ])
        .unwrap();

        assert!(image.save(&path, &EncodeConfig::with_bits(4)));
        let loaded = GifImage::open(&path);
        assert!(loaded.is_valid());
        assert_eq!(loaded.frame_count(), 2);
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.source_format(), Some(PixelFormat::Indexed(4)));
        assert_eq!(loaded.frame(1).unwrap().pixel(0, 0), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_failed_save_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.gif");
        fs::write(&path, b"original").unwrap();

        let image = GifImage::from_frame(solid(2, 2, [0; 4]));
        let bad = EncodeConfig { format: PixelFormat::Rgba8, ..EncodeConfig::default() };
        assert!(!image.save(&path, &bad));
        assert!(!GifImage::new().save(&path, &EncodeConfig::default()));
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }

    #[test]
    fn test_codec_trait_surface() {
        let mut image = GifImage::new();
        let codec: &mut dyn ImageCodec<Options = EncodeConfig> = &mut image;
        assert_eq!(codec.format(), ImageFormat::Gif);
        assert!(codec.set_frames(vec![solid(1, 1, [0; 4])]));
        assert!(codec.is_valid());
        assert!(!codec.set_frames(vec![solid(1, 1, [0; 4]), solid(2, 1, [0; 4])]));
        assert_eq!(codec.frame_count(), 1);
        codec.clear();
        assert!(!codec.is_valid());
    }
}
