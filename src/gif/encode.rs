//! Encode engine: frames plus an [`EncodeConfig`] to a GIF stream
//!
//! Per frame: resolve the delay, flip rows to top-down, quantize, and hand
//! the palette and indices to the `gif` crate encoder. The first frame's
//! palette becomes the global colour table; later frames carry a local
//! table only when theirs differs.

use std::borrow::Cow;
use std::io::Write;

use super::error::GifError;
use super::options::{AlphaThreshold, EncodeConfig};
use crate::format::PixelFormat;
use crate::frame::Frame;
use crate::quantize::{Quantized, QuantizeRequest, Quantizer, OPAQUE_THRESHOLD};

/// Shortest delay (hundredths of a second) written to a frame
pub const MIN_DELAY: u16 = 2;

/// Check the target format, returning the palette size.
pub fn validate(config: &EncodeConfig) -> Result<usize, GifError> {
    match config.format {
        PixelFormat::Indexed(bits) if (1..=8).contains(&bits) => Ok(1usize << bits),
        PixelFormat::Indexed(bits) => Err(GifError::BitDepth(bits)),
        other => Err(GifError::NotIndexed(other)),
    }
}

/// Resolve the alpha cutoff once for the whole animation.
///
/// A 1-bit palette has no room for a transparent entry, so it is always
/// encoded opaque.
pub fn resolve_alpha_threshold(frames: &[Frame], policy: AlphaThreshold, bits: u8) -> u8 {
    if bits <= 1 {
        return OPAQUE_THRESHOLD;
    }
    match policy {
        AlphaThreshold::Opaque => OPAQUE_THRESHOLD,
        AlphaThreshold::Cutoff(t) => t,
        AlphaThreshold::Auto => {
            if frames.iter().any(Frame::has_translucency) {
                AlphaThreshold::AUTO_CUTOFF
            } else {
                OPAQUE_THRESHOLD
            }
        }
    }
}

/// Delay to write for `frame`, in hundredths of a second (at least [`MIN_DELAY`]).
pub fn resolve_delay(frame: &Frame, duration_override: Option<u16>) -> u16 {
    let hundredths = match duration_override {
        Some(d) => d as f32,
        None => (frame.duration() * 100.0).round(),
    };
    hundredths.clamp(MIN_DELAY as f32, u16::MAX as f32) as u16
}

/// Encode `frames` into `writer`.
///
/// Nothing is written until the configuration and frame dimensions have
/// been checked.
pub fn encode<W, Q>(
    frames: &[Frame],
    config: &EncodeConfig,
    quantizer: &Q,
    writer: W,
) -> Result<(), GifError>
where
    W: Write,
    Q: Quantizer + ?Sized,
{
    let palette_size = validate(config)?;
    let first = frames.first().ok_or(GifError::NoFrames)?;
    let (width, height) = (first.width(), first.height());
    for (index, frame) in frames.iter().enumerate() {
        if (frame.width(), frame.height()) != (width, height) {
            return Err(GifError::DimensionMismatch {
                index,
                actual: (frame.width(), frame.height()),
                expected: (width, height),
            });
        }
    }
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(GifError::TooLarge { width, height }),
    };

    let bits = config.format.bits_per_pixel();
    let threshold = resolve_alpha_threshold(frames, config.alpha_threshold, bits);
    log::debug!(
        "encoding {} frames at {}x{}, {} colours via {}, alpha threshold {}",
        frames.len(),
        width,
        height,
        palette_size,
        config.method,
        threshold
    );

    let quantize_frame = |frame: &Frame| -> Result<Quantized, GifError> {
        let top_down = frame.to_top_down();
        let request = QuantizeRequest {
            pixels: &top_down,
            width: width as usize,
            height: height as usize,
            palette_size,
            method: config.method,
            tuning: config.tuning,
            alpha_threshold: threshold,
        };
        Ok(quantizer.quantize(&request)?)
    };

    let first_quantized = quantize_frame(first)?;
    let global = first_quantized.palette_bytes();
    let mut encoder = gif::Encoder::new(writer, w16, h16, &global)?;
    if frames.len() > 1 {
        let repeat = match config.loops {
            0 => gif::Repeat::Infinite,
            n => gif::Repeat::Finite(n),
        };
        encoder.set_repeat(repeat)?;
    }

    let mut pending = Some(first_quantized);
    for (index, frame) in frames.iter().enumerate() {
        let quantized = match pending.take() {
            Some(q) => q,
            None => quantize_frame(frame)?,
        };
        let delay = resolve_delay(frame, config.duration_override);
        let palette = quantized.palette_bytes();
        let local = if palette == global { None } else { Some(palette) };

        let out = gif::Frame {
            width: w16,
            height: h16,
            delay,
            dispose: gif::DisposalMethod::Background,
            transparent: quantized.transparent,
            palette: local,
            buffer: Cow::Owned(quantized.indices),
            ..gif::Frame::default()
        };
        encoder.write_frame(&out)?;
        log::debug!("frame {}: delay {}, transparent {:?}", index, delay, out.transparent);
    }

    Ok(())
}
