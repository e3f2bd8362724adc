//! Composited animation frames
//!
//! A [`Frame`] owns one RGBA8 pixel buffer of `width * height * 4` bytes.
//! Rows are stored bottom-row-first: row 0 of the buffer is the bottom of
//! the image. Conversions to and from top-down layouts (the orientation used
//! by the GIF bitstream and by [`image::RgbaImage`]) go through
//! [`reverse_rows`].

use image::RgbaImage;
use thiserror::Error;

/// Bytes per RGBA8 pixel
pub const CHANNELS: usize = 4;

/// Error constructing a frame from raw parts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Pixel buffer length doesn't match `width * height * 4`
    #[error("pixel buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32, expected: usize, actual: usize },
    /// Width or height is zero
    #[error("frame dimensions must be non-zero, got {0}x{1}")]
    Empty(u32, u32),
}

/// One fully composited frame of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    duration: f32,
}

impl Frame {
    /// Wrap a bottom-up RGBA8 buffer.
    ///
    /// `duration` is the display time in seconds; negative values are
    /// stored as zero.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, duration: f32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty(width, height));
        }
        let expected = buffer_len(width, height);
        if pixels.len() != expected {
            return Err(FrameError::BufferSize { width, height, expected, actual: pixels.len() });
        }
        Ok(Self { width, height, pixels, duration: duration.max(0.0) })
    }

    /// Wrap a top-down RGBA8 buffer, flipping it into bottom-up order.
    pub fn from_top_down(
        width: u32,
        height: u32,
        mut pixels: Vec<u8>,
        duration: f32,
    ) -> Result<Self, FrameError> {
        let expected = buffer_len(width, height);
        if pixels.len() == expected {
            reverse_rows(&mut pixels, width as usize);
        }
        Self::new(width, height, pixels, duration)
    }

    /// Build a frame from an [`RgbaImage`] (which is top-down).
    pub fn from_rgba_image(image: &RgbaImage, duration: f32) -> Result<Self, FrameError> {
        Self::from_top_down(image.width(), image.height(), image.as_raw().clone(), duration)
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Display duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }

    /// Bottom-up RGBA8 pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Release the pixel buffer to the caller.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)` where `y = 0` is the bottom row.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let p = &self.pixels[i..i + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// RGBA value at `(x, y)` where `y = 0` is the top row.
    pub fn pixel_top_down(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if y >= self.height {
            return None;
        }
        self.pixel(x, self.height - 1 - y)
    }

    /// Copy of the pixels in top-down row order.
    pub fn to_top_down(&self) -> Vec<u8> {
        let mut rows = self.pixels.clone();
        reverse_rows(&mut rows, self.width as usize);
        rows
    }

    /// Copy into an [`RgbaImage`] (top-down).
    pub fn to_rgba_image(&self) -> RgbaImage {
        // Dimensions and length are checked at construction
        RgbaImage::from_raw(self.width, self.height, self.to_top_down())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// True if any pixel has alpha below 255.
    pub fn has_translucency(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).any(|p| p[3] != u8::MAX)
    }
}

/// Byte length of an RGBA8 buffer with the given dimensions.
pub fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

/// Reverse the row order of an RGBA8 buffer in place.
///
/// `width` is in pixels. A trailing partial row is left untouched.
pub fn reverse_rows(pixels: &mut [u8], width: usize) {
    let stride = width * CHANNELS;
    if stride == 0 {
        return;
    }
    let rows = pixels.len() / stride;
    for top in 0..rows / 2 {
        let bottom = rows - 1 - top;
        let (head, tail) = pixels.split_at_mut(bottom * stride);
        head[top * stride..(top + 1) * stride].swap_with_slice(&mut tail[..stride]);
    }
}
