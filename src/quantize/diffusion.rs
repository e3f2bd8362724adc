//! Error-diffusion mapping for the spatial method
//!
//! Error is pushed forward in raster order. The kernel is picked from the
//! filter size: 1 disables diffusion, 3 is Floyd-Steinberg, 5 is
//! Jarvis-Judice-Ninke.

use super::{nearest, Rgb, Tuning};

/// (dx, dy, weight) taps; weights are over the kernel's divisor
type Taps = &'static [(isize, usize, f32)];

const FLOYD_STEINBERG: (Taps, f32) = (&[(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)], 16.0);

const JARVIS_JUDICE_NINKE: (Taps, f32) = (
    &[
        (1, 0, 7.0),
        (2, 0, 5.0),
        (-2, 1, 3.0),
        (-1, 1, 5.0),
        (0, 1, 7.0),
        (1, 1, 5.0),
        (2, 1, 3.0),
        (-2, 2, 1.0),
        (-1, 2, 3.0),
        (0, 2, 5.0),
        (1, 2, 3.0),
        (2, 2, 1.0),
    ],
    48.0,
);

fn kernel(filter_size: u8) -> Option<(Taps, f32)> {
    match filter_size {
        0 | 1 => None,
        2 | 3 => Some(FLOYD_STEINBERG),
        _ => Some(JARVIS_JUDICE_NINKE),
    }
}

/// Map top-down RGBA pixels onto `palette`, diffusing quantization error.
///
/// Transparent pixels take the reserved slot and neither receive nor pass
/// on error.
pub(crate) fn diffuse(
    pixels: &[u8],
    width: usize,
    palette: &[Rgb],
    tuning: Tuning,
    transparent: Option<u8>,
    is_clear: impl Fn(&[u8]) -> bool,
) -> Vec<u8> {
    let strength = tuning.dither.clamp(0.0, 1.0);
    let kernel = if strength > 0.0 { kernel(tuning.filter_size) } else { None };
    let count = pixels.len() / 4;
    let height = if width == 0 { 0 } else { count / width };

    let mut error = vec![[0f32; 3]; count];
    let mut indices = Vec::with_capacity(count);

    for (i, p) in pixels.chunks_exact(4).enumerate() {
        if let Some(slot) = transparent.filter(|_| is_clear(p)) {
            indices.push(slot);
            continue;
        }

        let mut wanted = [0f32; 3];
        for c in 0..3 {
            wanted[c] = (p[c] as f32 + error[i][c]).clamp(0.0, 255.0);
        }
        let index = nearest(
            palette,
            [wanted[0].round() as i32, wanted[1].round() as i32, wanted[2].round() as i32],
        );
        indices.push(index);

        let Some((taps, divisor)) = kernel else { continue };
        let chosen = palette[index as usize];
        let (x, y) = (i % width, i / width);
        for &(dx, dy, weight) in taps {
            let nx = x as isize + dx;
            let ny = y + dy;
            if nx < 0 || nx as usize >= width || ny >= height {
                continue;
            }
            let target = ny * width + nx as usize;
            for c in 0..3 {
                let residual = wanted[c] - chosen[c] as f32;
                error[target][c] += residual * strength * weight / divisor;
            }
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_gray(value: u8, width: usize, height: usize) -> Vec<u8> {
        (0..width * height).flat_map(|_| [value, value, value, 255]).collect()
    }

    fn tuning(dither: f32, filter_size: u8) -> Tuning {
        Tuning { dither, filter_size, ..Tuning::default() }
    }

    #[test]
    fn test_mid_gray_dithers_to_mix() {
        let pixels = flat_gray(128, 8, 8);
        let palette = [[0, 0, 0], [255, 255, 255]];
        let indices = diffuse(&pixels, 8, &palette, tuning(1.0, 3), None, |_| false);

        let whites = indices.iter().filter(|&&i| i == 1).count();
        assert!(whites > 16 && whites < 48, "expected a mix, got {whites} whites of 64");
    }

    #[test]
    fn test_no_dither_is_nearest() {
        let pixels = flat_gray(128, 4, 4);
        let palette = [[0, 0, 0], [255, 255, 255]];
        for (dither, filter) in [(0.0, 3), (1.0, 1)] {
            let indices = diffuse(&pixels, 4, &palette, tuning(dither, filter), None, |_| false);
            assert!(indices.iter().all(|&i| i == indices[0]));
        }
    }

    #[test]
    fn test_wide_kernel_also_mixes() {
        let pixels = flat_gray(64, 8, 8);
        let palette = [[0, 0, 0], [255, 255, 255]];
        let indices = diffuse(&pixels, 8, &palette, tuning(1.0, 5), None, |_| false);
        assert!(indices.contains(&0));
        assert!(indices.contains(&1));
    }

    #[test]
    fn test_transparent_pixels_take_slot() {
        let mut pixels = flat_gray(200, 2, 2);
        pixels[3] = 0;
        let palette = [[0, 0, 0], [255, 255, 255]];
        let indices = diffuse(&pixels, 2, &palette, tuning(1.0, 3), Some(2), |p| p[3] == 0);
        assert_eq!(indices[0], 2);
        assert!(indices[1..].iter().all(|&i| i < 2));
    }
}
