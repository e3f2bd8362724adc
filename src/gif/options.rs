//! Encode parameters

use crate::format::PixelFormat;
use crate::quantize::{Method, Tuning, OPAQUE_THRESHOLD};

/// How the alpha cutoff is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaThreshold {
    /// Use 127 if any pixel is translucent, otherwise encode opaque
    #[default]
    Auto,
    /// No transparency
    Opaque,
    /// Pixels with alpha at or below the value become transparent
    Cutoff(u8),
}

impl AlphaThreshold {
    /// Threshold chosen by [`AlphaThreshold::Auto`] when translucency is found
    pub const AUTO_CUTOFF: u8 = 127;

    /// Map the integer policy (-1 auto, 255 opaque, 0..=254 explicit).
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            -1 => Some(AlphaThreshold::Auto),
            255 => Some(AlphaThreshold::Opaque),
            0..=254 => Some(AlphaThreshold::Cutoff(value as u8)),
            _ => None,
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            AlphaThreshold::Auto => -1,
            AlphaThreshold::Opaque => OPAQUE_THRESHOLD as i32,
            AlphaThreshold::Cutoff(t) => t as i32,
        }
    }
}

/// Everything the encoder needs besides the frames
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeConfig {
    /// Must be [`PixelFormat::Indexed`] with 1..=8 bits
    pub format: PixelFormat,
    pub method: Method,
    /// Animation repeat count, 0 = forever
    pub loops: u16,
    pub alpha_threshold: AlphaThreshold,
    /// Per-frame delay in hundredths of a second; `None` uses each frame's duration
    pub duration_override: Option<u16>,
    pub tuning: Tuning,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: PixelFormat::Indexed(8),
            method: Method::default(),
            loops: 0,
            alpha_threshold: AlphaThreshold::default(),
            duration_override: None,
            tuning: Tuning::default(),
        }
    }
}

impl EncodeConfig {
    pub fn with_bits(bits: u8) -> Self {
        Self { format: PixelFormat::Indexed(bits), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(AlphaThreshold::from_raw(-1), Some(AlphaThreshold::Auto));
        assert_eq!(AlphaThreshold::from_raw(255), Some(AlphaThreshold::Opaque));
        assert_eq!(AlphaThreshold::from_raw(0), Some(AlphaThreshold::Cutoff(0)));
        assert_eq!(AlphaThreshold::from_raw(254), Some(AlphaThreshold::Cutoff(254)));
        assert_eq!(AlphaThreshold::from_raw(-2), None);
        assert_eq!(AlphaThreshold::from_raw(256), None);
    }

    #[test]
    fn test_raw_round_trip() {
        for raw in [-1, 0, 127, 254, 255] {
            assert_eq!(AlphaThreshold::from_raw(raw).map(AlphaThreshold::to_raw), Some(raw));
        }
    }

    #[test]
    fn test_default_config() {
        let config = EncodeConfig::default();
        assert_eq!(config.format, PixelFormat::Indexed(8));
        assert_eq!(config.alpha_threshold, AlphaThreshold::Auto);
        assert_eq!(config.duration_override, None);
        assert_eq!(EncodeConfig::with_bits(4).format, PixelFormat::Indexed(4));
    }
}
