//! Configuration schema types for `gifanim.toml`
//!
//! Raw values keep the integer conventions of the file format (`-1` for
//! auto/none) and are checked by [`GifanimConfig::validate`] before being
//! turned into an [`EncodeConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::PixelFormat;
use crate::gif::{AlphaThreshold, EncodeConfig};
use crate::quantize::{Method, Tuning};

/// Complete `gifanim.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GifanimConfig {
    #[serde(default)]
    pub encode: EncodeSection,
}

/// `[encode]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeSection {
    /// Palette bit depth, 1..=8
    #[serde(default = "default_bits")]
    pub bits: u8,
    #[serde(default)]
    pub method: Method,
    /// 0 = loop forever
    #[serde(default)]
    pub loops: u16,
    /// -1 auto, 255 opaque, 0..=254 cutoff
    #[serde(default = "default_auto")]
    pub alpha_threshold: i32,
    /// -1 = each frame's own duration, otherwise hundredths of a second
    #[serde(default = "default_auto")]
    pub duration: i32,
    #[serde(default)]
    pub spatial: SpatialSection,
    #[serde(default)]
    pub neural: NeuralSection,
}

fn default_bits() -> u8 {
    8
}

fn default_auto() -> i32 {
    -1
}

impl Default for EncodeSection {
    fn default() -> Self {
        Self {
            bits: default_bits(),
            method: Method::default(),
            loops: 0,
            alpha_threshold: default_auto(),
            duration: default_auto(),
            spatial: SpatialSection::default(),
            neural: NeuralSection::default(),
        }
    }
}

/// `[encode.spatial]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialSection {
    /// Error-diffusion strength, 0.0..=1.0
    #[serde(default = "default_dither")]
    pub dither: f32,
    /// 1 (none), 3 (Floyd-Steinberg) or 5 (Jarvis-Judice-Ninke)
    #[serde(default = "default_filter_size")]
    pub filter_size: u8,
}

fn default_dither() -> f32 {
    Tuning::default().dither
}

fn default_filter_size() -> u8 {
    Tuning::default().filter_size
}

impl Default for SpatialSection {
    fn default() -> Self {
        Self { dither: default_dither(), filter_size: default_filter_size() }
    }
}

/// `[encode.neural]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralSection {
    /// NeuQuant sampling divisor, 1..=30
    #[serde(default = "default_sample_factor")]
    pub sample_factor: i32,
}

fn default_sample_factor() -> i32 {
    Tuning::default().sample_factor
}

impl Default for NeuralSection {
    fn default() -> Self {
        Self { sample_factor: default_sample_factor() }
    }
}

/// A single rule violated by a config
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl GifanimConfig {
    /// Check every rule, returning all violations.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.encode.validate()
    }

    /// Typed encode configuration. Only meaningful once [`validate`](Self::validate)
    /// returned no errors.
    pub fn encode_config(&self) -> EncodeConfig {
        self.encode.to_encode_config()
    }
}

impl EncodeSection {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(ValidationError { field: field.to_string(), message })
        };

        if !(1..=8).contains(&self.bits) {
            fail("encode.bits", format!("must be between 1 and 8, got {}", self.bits));
        }
        if AlphaThreshold::from_raw(self.alpha_threshold).is_none() {
            fail(
                "encode.alpha_threshold",
                format!("must be -1 (auto) or 0..=255, got {}", self.alpha_threshold),
            );
        }
        if self.duration < -1 || self.duration > i32::from(u16::MAX) {
            fail(
                "encode.duration",
                format!("must be -1 or 0..={}, got {}", u16::MAX, self.duration),
            );
        }
        if !(0.0..=1.0).contains(&self.spatial.dither) {
            fail(
                "encode.spatial.dither",
                format!("must be between 0.0 and 1.0, got {}", self.spatial.dither),
            );
        }
        if ![1, 3, 5].contains(&self.spatial.filter_size) {
            fail(
                "encode.spatial.filter_size",
                format!("must be 1, 3 or 5, got {}", self.spatial.filter_size),
            );
        }
        if !(1..=30).contains(&self.neural.sample_factor) {
            fail(
                "encode.neural.sample_factor",
                format!("must be between 1 and 30, got {}", self.neural.sample_factor),
            );
        }

        errors
    }

    pub fn to_encode_config(&self) -> EncodeConfig {
        EncodeConfig {
            format: PixelFormat::Indexed(self.bits),
            method: self.method,
            loops: self.loops,
            alpha_threshold: AlphaThreshold::from_raw(self.alpha_threshold).unwrap_or_default(),
            duration_override: u16::try_from(self.duration).ok(),
            tuning: Tuning {
                dither: self.spatial.dither,
                filter_size: self.spatial.filter_size,
                sample_factor: self.neural.sample_factor,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: GifanimConfig = toml::from_str("").unwrap();
        assert_eq!(config, GifanimConfig::default());
        assert!(config.validate().is_empty());
        assert_eq!(config.encode_config(), EncodeConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config: GifanimConfig = toml::from_str(
            r#"
[encode]
bits = 4
method = "spatial"
loops = 3
alpha_threshold = 200
duration = 5

[encode.spatial]
dither = 0.5
filter_size = 5

[encode.neural]
sample_factor = 1
"#,
        )
        .unwrap();
        assert!(config.validate().is_empty());

        let encode = config.encode_config();
        assert_eq!(encode.format, PixelFormat::Indexed(4));
        assert_eq!(encode.method, Method::Spatial);
        assert_eq!(encode.loops, 3);
        assert_eq!(encode.alpha_threshold, AlphaThreshold::Cutoff(200));
        assert_eq!(encode.duration_override, Some(5));
        assert_eq!(encode.tuning.dither, 0.5);
        assert_eq!(encode.tuning.filter_size, 5);
        assert_eq!(encode.tuning.sample_factor, 1);
    }

    #[test]
    fn test_special_values() {
        let mut section = EncodeSection { alpha_threshold: 255, ..EncodeSection::default() };
        assert_eq!(section.to_encode_config().alpha_threshold, AlphaThreshold::Opaque);
        section.alpha_threshold = -1;
        assert_eq!(section.to_encode_config().alpha_threshold, AlphaThreshold::Auto);
        section.duration = 0;
        assert_eq!(section.to_encode_config().duration_override, Some(0));
        section.duration = -1;
        assert_eq!(section.to_encode_config().duration_override, None);
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let section = EncodeSection {
            bits: 9,
            method: Method::Neural,
            loops: 0,
            alpha_threshold: 300,
            duration: -5,
            spatial: SpatialSection { dither: 1.5, filter_size: 4 },
            neural: NeuralSection { sample_factor: 0 },
        };
        let fields: Vec<String> = section.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "encode.bits",
                "encode.alpha_threshold",
                "encode.duration",
                "encode.spatial.dither",
                "encode.spatial.filter_size",
                "encode.neural.sample_factor",
            ]
        );
    }

    #[test]
    fn test_unknown_method_is_parse_error() {
        let result: Result<GifanimConfig, _> = toml::from_str("[encode]\nmethod = \"magic\"");
        assert!(result.is_err());
    }
}
