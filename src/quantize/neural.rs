//! NeuQuant palette training

use super::Rgb;
use color_quant::NeuQuant;

/// NeuQuant runs a fixed number of learning cycles over a sample of the
/// input; tiny images are repeated up to this many pixels so every cycle
/// sees at least one sample.
const MIN_TRAINING_PIXELS: usize = 4096;

/// A trained network and its colour map.
pub(crate) struct Network {
    net: NeuQuant,
    palette: Vec<Rgb>,
}

impl Network {
    pub(crate) fn index_of(&self, rgb: Rgb) -> u8 {
        self.net.index_of(&[rgb[0], rgb[1], rgb[2], u8::MAX]) as u8
    }

    pub(crate) fn into_palette(self) -> Vec<Rgb> {
        self.palette
    }
}

/// Train a `colours`-entry network on `opaque` pixels.
///
/// `sample_factor` is clamped to NeuQuant's 1..=30 range.
pub(crate) fn train(opaque: &[Rgb], colours: usize, sample_factor: i32) -> Network {
    let sample_factor = sample_factor.clamp(1, 30);
    let repeats = MIN_TRAINING_PIXELS.div_ceil(opaque.len().max(1)).max(1);

    let mut rgba = Vec::with_capacity(opaque.len() * repeats * 4);
    for _ in 0..repeats {
        for c in opaque {
            rgba.extend_from_slice(&[c[0], c[1], c[2], u8::MAX]);
        }
    }

    let net = NeuQuant::new(sample_factor, colours.max(1), &rgba);
    let palette = net.color_map_rgb().chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    Network { net, palette }
}
