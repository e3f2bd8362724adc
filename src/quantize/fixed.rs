//! Image-independent palettes

use super::Rgb;

/// Uniform palette with `size` entries (`size` is a power of two, 2..=256).
///
/// Depths of 3 bits and up split the bits across channels with green
/// getting the most and blue the least (8 bits: 3-3-2). Shallower depths
/// use an evenly spaced grey ramp.
pub(crate) fn palette(size: usize) -> Vec<Rgb> {
    let bits = size.max(2).trailing_zeros();
    if bits < 3 {
        return (0..size).map(|i| gray(level(i, size))).collect();
    }

    let green_bits = (bits + 2) / 3;
    let red_bits = (bits + 1) / 3;
    let blue_bits = bits / 3;
    let (reds, greens, blues) = (1usize << red_bits, 1usize << green_bits, 1usize << blue_bits);

    let mut entries = Vec::with_capacity(size);
    for r in 0..reds {
        for g in 0..greens {
            for b in 0..blues {
                entries.push([level(r, reds), level(g, greens), level(b, blues)]);
            }
        }
    }
    entries
}

/// `i`th of `count` evenly spaced values over 0..=255
fn level(i: usize, count: usize) -> u8 {
    if count <= 1 {
        return 0;
    }
    (i * 255 / (count - 1)) as u8
}

fn gray(v: u8) -> Rgb {
    [v, v, v]
}
