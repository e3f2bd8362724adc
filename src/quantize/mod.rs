//! Colour quantization service
//!
//! Turns top-down RGBA8 pixels into a fixed-size palette plus one index per
//! pixel. Four interchangeable strategies are available through [`Method`]:
//!
//! - `Fixed`: a uniform colour cube independent of the image
//! - `Spatial`: median-cut palette with error diffusion
//! - `Neural`: NeuQuant self-organising map (via `color_quant`)
//! - `Statistical`: median cut over the colour histogram
//!
//! Transparency is decided by the alpha threshold: with a threshold below
//! 255 the last palette slot is reserved and every pixel with
//! `alpha <= threshold` maps to it.

mod diffusion;
mod fixed;
mod median_cut;
mod neural;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// RGB palette entry
pub type Rgb = [u8; 3];

/// Threshold value that disables transparency.
pub const OPAQUE_THRESHOLD: u8 = u8::MAX;

/// Quantization strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Fixed,
    Spatial,
    #[default]
    Neural,
    Statistical,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Fixed => "fixed",
            Method::Spatial => "spatial",
            Method::Neural => "neural",
            Method::Statistical => "statistical",
        };
        f.write_str(name)
    }
}

/// Method-specific knobs. Each method reads only its own fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Spatial: error-diffusion strength, 0.0 (none) to 1.0 (full)
    pub dither: f32,
    /// Spatial: diffusion kernel width, 1 (none), 3 or 5
    pub filter_size: u8,
    /// Neural: sampling divisor, 1 (every pixel) to 30
    pub sample_factor: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self { dither: 1.0, filter_size: 3, sample_factor: 10 }
    }
}

/// Quantization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("palette size {0} is outside 2..=256")]
    PaletteSize(usize),
    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Input to a quantizer
#[derive(Debug, Clone, Copy)]
pub struct QuantizeRequest<'a> {
    /// Top-down RGBA8 pixels
    pub pixels: &'a [u8],
    pub width: usize,
    pub height: usize,
    /// Total number of palette entries, including any transparent slot
    pub palette_size: usize,
    pub method: Method,
    pub tuning: Tuning,
    /// Resolved alpha cutoff, [`OPAQUE_THRESHOLD`] for none
    pub alpha_threshold: u8,
}

/// Palette plus index buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    /// Exactly `palette_size` entries
    pub palette: Vec<Rgb>,
    /// One entry per pixel, top-down
    pub indices: Vec<u8>,
    /// Palette slot reserved for transparent pixels
    pub transparent: Option<u8>,
}

impl Quantized {
    /// Palette flattened to `r, g, b, r, g, b, ...`
    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette.iter().flatten().copied().collect()
    }
}

/// A palette/index generator.
pub trait Quantizer {
    fn quantize(&self, request: &QuantizeRequest<'_>) -> Result<Quantized, QuantizeError>;
}

/// Built-in quantizer dispatching on [`Method`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteQuantizer;

impl Quantizer for PaletteQuantizer {
    fn quantize(&self, request: &QuantizeRequest<'_>) -> Result<Quantized, QuantizeError> {
        quantize(request)
    }
}

/// Run the built-in quantizer.
pub fn quantize(request: &QuantizeRequest<'_>) -> Result<Quantized, QuantizeError> {
    let palette_size = request.palette_size;
    if !(2..=256).contains(&palette_size) {
        return Err(QuantizeError::PaletteSize(palette_size));
    }
    let expected = request.width * request.height * 4;
    if request.pixels.len() != expected {
        return Err(QuantizeError::BufferSize { expected, actual: request.pixels.len() });
    }

    let threshold = request.alpha_threshold;
    let transparent =
        if threshold < OPAQUE_THRESHOLD { Some((palette_size - 1) as u8) } else { None };
    let colours = if transparent.is_some() { palette_size - 1 } else { palette_size };
    let is_clear = |p: &[u8]| transparent.is_some() && p[3] <= threshold;

    let opaque: Vec<Rgb> = request
        .pixels
        .chunks_exact(4)
        .filter(|p| !is_clear(*p))
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let (mut palette, indices) = match request.method {
        Method::Fixed => {
            let mut palette = fixed::palette(palette_size);
            palette.truncate(colours);
            let indices = map_nearest(request.pixels, &palette, transparent, is_clear);
            (palette, indices)
        }
        Method::Statistical => {
            let palette = ensure_nonempty(median_cut::palette(&histogram(&opaque), colours));
            let indices = map_nearest(request.pixels, &palette, transparent, is_clear);
            (palette, indices)
        }
        Method::Spatial => {
            let palette = ensure_nonempty(median_cut::palette(&histogram(&opaque), colours));
            let indices = diffusion::diffuse(
                request.pixels,
                request.width,
                &palette,
                request.tuning,
                transparent,
                is_clear,
            );
            (palette, indices)
        }
        Method::Neural => {
            let counts = histogram(&opaque);
            if counts.len() <= colours {
                // Few enough colours to keep them exactly
                let palette = ensure_nonempty(median_cut::palette(&counts, colours));
                let indices = map_nearest(request.pixels, &palette, transparent, is_clear);
                (palette, indices)
            } else {
                let network = neural::train(&opaque, colours, request.tuning.sample_factor);
                let indices = request
                    .pixels
                    .chunks_exact(4)
                    .map(|p| match transparent {
                        Some(slot) if is_clear(p) => slot,
                        _ => network.index_of([p[0], p[1], p[2]]),
                    })
                    .collect();
                (network.into_palette(), indices)
            }
        }
    };

    palette.resize(palette_size, [0, 0, 0]);
    log::debug!(
        "quantized {}x{} with {} into {} entries (transparent slot: {:?})",
        request.width,
        request.height,
        request.method,
        palette_size,
        transparent
    );
    Ok(Quantized { palette, indices, transparent })
}

/// Count occurrences of each opaque colour.
fn histogram(colours: &[Rgb]) -> HashMap<Rgb, u32> {
    let mut counts = HashMap::new();
    for &c in colours {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

fn ensure_nonempty(mut palette: Vec<Rgb>) -> Vec<Rgb> {
    if palette.is_empty() {
        palette.push([0, 0, 0]);
    }
    palette
}

/// Index of the palette entry closest to `colour` (squared RGB distance).
pub(crate) fn nearest(palette: &[Rgb], colour: [i32; 3]) -> u8 {
    let mut best = 0usize;
    let mut best_dist = i32::MAX;
    for (i, entry) in palette.iter().enumerate() {
        let dr = entry[0] as i32 - colour[0];
        let dg = entry[1] as i32 - colour[1];
        let db = entry[2] as i32 - colour[2];
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best = i;
            best_dist = dist;
            if dist == 0 {
                break;
            }
        }
    }
    best as u8
}

fn map_nearest(
    pixels: &[u8],
    palette: &[Rgb],
    transparent: Option<u8>,
    is_clear: impl Fn(&[u8]) -> bool,
) -> Vec<u8> {
    let mut cache: HashMap<Rgb, u8> = HashMap::new();
    pixels
        .chunks_exact(4)
        .map(|p| match transparent {
            Some(slot) if is_clear(p) => slot,
            _ => {
                let rgb = [p[0], p[1], p[2]];
                *cache.entry(rgb).or_insert_with(|| {
                    nearest(palette, [rgb[0] as i32, rgb[1] as i32, rgb[2] as i32])
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [Method; 4] =
        [Method::Fixed, Method::Spatial, Method::Neural, Method::Statistical];

    fn request(pixels: &[u8], width: usize, palette_size: usize, method: Method, threshold: u8) -> QuantizeRequest<'_> {
        QuantizeRequest {
            pixels,
            width,
            height: pixels.len() / 4 / width,
            palette_size,
            method,
            tuning: Tuning::default(),
            alpha_threshold: threshold,
        }
    }

    /// 4x4 gradient with two fully transparent pixels
    fn gradient_with_holes() -> Vec<u8> {
        let mut pixels = Vec::new();
        for i in 0..16u8 {
            let alpha = if i == 3 || i == 9 { 0 } else { 255 };
            pixels.extend_from_slice(&[i * 16, 255 - i * 16, i * 8, alpha]);
        }
        pixels
    }

    #[test]
    fn test_every_method_fills_palette_exactly() {
        let pixels = gradient_with_holes();
        for method in METHODS {
            let q = quantize(&request(&pixels, 4, 8, method, OPAQUE_THRESHOLD)).unwrap();
            assert_eq!(q.palette.len(), 8, "{method}");
            assert_eq!(q.indices.len(), 16, "{method}");
            assert!(q.indices.iter().all(|&i| (i as usize) < 8), "{method}");
            assert_eq!(q.transparent, None, "{method}");
        }
    }

    #[test]
    fn test_transparent_slot_is_last_and_used() {
        let pixels = gradient_with_holes();
        for method in METHODS {
            let q = quantize(&request(&pixels, 4, 16, method, 127)).unwrap();
            assert_eq!(q.transparent, Some(15), "{method}");
            assert_eq!(q.indices[3], 15, "{method}");
            assert_eq!(q.indices[9], 15, "{method}");
            assert!(q.indices.iter().enumerate().all(|(i, &idx)| (idx == 15) == (i == 3 || i == 9)), "{method}");
        }
    }

    #[test]
    fn test_cutoff_compares_inclusive() {
        let pixels = [10, 10, 10, 100, 20, 20, 20, 101];
        let q = quantize(&request(&pixels, 2, 4, Method::Statistical, 100)).unwrap();
        assert_eq!(q.indices[0], 3);
        assert_ne!(q.indices[1], 3);
    }

    #[test]
    fn test_exact_colours_survive() {
        let pixels = [255, 0, 0, 255, 0, 0, 255, 255, 255, 0, 0, 255, 0, 0, 255, 255];
        for method in [Method::Neural, Method::Statistical, Method::Spatial] {
            let q = quantize(&request(&pixels, 2, 4, method, OPAQUE_THRESHOLD)).unwrap();
            let red = q.palette[q.indices[0] as usize];
            let blue = q.palette[q.indices[1] as usize];
            assert_eq!(red, [255, 0, 0], "{method}");
            assert_eq!(blue, [0, 0, 255], "{method}");
            assert_eq!(q.indices[0], q.indices[2]);
        }
    }

    #[test]
    fn test_all_transparent_image() {
        let pixels = [0u8; 16];
        let q = quantize(&request(&pixels, 2, 2, Method::Neural, 0)).unwrap();
        assert_eq!(q.indices, vec![1; 4]);
        assert_eq!(q.palette.len(), 2);
    }

    #[test]
    fn test_rejects_bad_palette_size() {
        let pixels = [0u8; 4];
        let err = quantize(&request(&pixels, 1, 512, Method::Fixed, OPAQUE_THRESHOLD)).unwrap_err();
        assert_eq!(err, QuantizeError::PaletteSize(512));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let mut req = request(&[0u8; 8], 2, 4, Method::Fixed, OPAQUE_THRESHOLD);
        req.height = 2;
        assert_eq!(quantize(&req).unwrap_err(), QuantizeError::BufferSize { expected: 16, actual: 8 });
    }

    #[test]
    fn test_nearest() {
        let palette = [[0, 0, 0], [255, 255, 255]];
        assert_eq!(nearest(&palette, [30, 30, 30]), 0);
        assert_eq!(nearest(&palette, [200, 200, 200]), 1);
    }

    #[test]
    fn test_palette_bytes() {
        let q = Quantized { palette: vec![[1, 2, 3], [4, 5, 6]], indices: vec![], transparent: None };
        assert_eq!(q.palette_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }
}
