//! Error type for GIF decoding and encoding

use thiserror::Error;

use crate::format::PixelFormat;
use crate::frame::FrameError;
use crate::quantize::QuantizeError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GifError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GIF decode error: {0}")]
    Decode(#[from] gif::DecodingError),
    #[error("GIF encode error: {0}")]
    Encode(#[from] gif::EncodingError),
    /// Missing `GIF87a`/`GIF89a` signature
    #[error("not a GIF stream")]
    NotGif,
    #[error("stream contains no frames")]
    NoFrames,
    #[error("logical screen is {0}x{1}")]
    EmptyCanvas(u16, u16),
    /// Logical screen needs more scratch memory than the decoder allows
    #[error("{width}x{height} canvas needs {bytes} bytes, over the {limit} byte decode limit")]
    CanvasLimit { width: u16, height: u16, bytes: u64, limit: u64 },
    #[error("could not allocate {0} bytes of frame data")]
    Allocation(usize),
    #[error("target format {0} is not an indexed format")]
    NotIndexed(PixelFormat),
    #[error("palette bit depth {0} is outside 1..=8")]
    BitDepth(u8),
    #[error("frame {index} is {actual_w}x{actual_h} but the canvas is {expected_w}x{expected_h}", actual_w = .actual.0, actual_h = .actual.1, expected_w = .expected.0, expected_h = .expected.1)]
    DimensionMismatch { index: usize, actual: (u32, u32), expected: (u32, u32) },
    #[error("{width}x{height} exceeds the GIF limit of 65535x65535")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Quantize(#[from] QuantizeError),
}
