//! Median cut over an RGB histogram

use super::Rgb;
use std::collections::HashMap;

/// A box of colours with their pixel counts.
#[derive(Debug, Clone)]
struct ColorBox {
    colors: Vec<(Rgb, u32)>,
}

impl ColorBox {
    /// Channel (0 = red, 1 = green, 2 = blue) with the largest range.
    fn widest_channel(&self) -> usize {
        let mut min = [u8::MAX; 3];
        let mut max = [0u8; 3];
        for (color, _) in &self.colors {
            for c in 0..3 {
                min[c] = min[c].min(color[c]);
                max[c] = max[c].max(color[c]);
            }
        }
        let range = |c: usize| max[c].saturating_sub(min[c]);

        if range(0) >= range(1) && range(0) >= range(2) {
            0
        } else if range(1) >= range(2) {
            1
        } else {
            2
        }
    }

    /// Split at the pixel-weighted median of the widest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = self.widest_channel();
        self.colors.sort_by_key(|(color, _)| color[channel]);

        let total = self.pixel_count();
        let mut running = 0u64;
        let mut split_idx = self.colors.len() / 2;
        for (i, (_, count)) in self.colors.iter().enumerate() {
            running += *count as u64;
            if running >= total / 2 {
                split_idx = i + 1;
                break;
            }
        }
        // Neither half may be empty
        split_idx = split_idx.clamp(1, self.colors.len() - 1);

        let right = self.colors.split_off(split_idx);
        (ColorBox { colors: self.colors }, ColorBox { colors: right })
    }

    fn average_color(&self) -> Rgb {
        let total = self.pixel_count();
        if total == 0 {
            return [0, 0, 0];
        }
        let mut sums = [0u64; 3];
        for (color, count) in &self.colors {
            for c in 0..3 {
                sums[c] += color[c] as u64 * *count as u64;
            }
        }
        [(sums[0] / total) as u8, (sums[1] / total) as u8, (sums[2] / total) as u8]
    }

    fn pixel_count(&self) -> u64 {
        self.colors.iter().map(|(_, count)| *count as u64).sum()
    }
}

/// Reduce `counts` to at most `max_colors` representative colours.
///
/// Histograms that already fit are returned as-is (sorted, so the result
/// is deterministic).
pub(crate) fn palette(counts: &HashMap<Rgb, u32>, max_colors: usize) -> Vec<Rgb> {
    let mut colors: Vec<(Rgb, u32)> = counts.iter().map(|(c, n)| (*c, *n)).collect();
    colors.sort_unstable();

    if colors.len() <= max_colors {
        return colors.into_iter().map(|(c, _)| c).collect();
    }

    let mut boxes = vec![ColorBox { colors }];
    while boxes.len() < max_colors {
        // Split the most populated box that still has more than one colour
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1)
            .max_by_key(|(_, b)| b.pixel_count())
            .map(|(i, _)| i);
        let Some(idx) = candidate else { break };

        let (left, right) = boxes.swap_remove(idx).split();
        boxes.push(left);
        boxes.push(right);
    }

    boxes.iter().map(ColorBox::average_color).collect()
}
