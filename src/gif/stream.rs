//! Bitstream reader driving the `gif` crate
//!
//! [`read_records`] parses the stream and invokes a visitor once per image
//! descriptor, synchronously and in file order. Index rows are handed over
//! exactly as they appear in the LZW stream, so interlaced records still
//! carry interlaced row order.

use std::io::Read;

use super::error::GifError;
use super::record::{StreamHeader, SubImage};

/// Parse a GIF stream, calling `visit` for every sub-image.
///
/// Returns the screen descriptor and the number of records visited. A
/// visitor error stops the walk and is returned unchanged.
pub fn read_records<R, F>(reader: R, mut visit: F) -> Result<(StreamHeader, usize), GifError>
where
    R: Read,
    F: FnMut(&StreamHeader, &SubImage<'_>) -> Result<(), GifError>,
{
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(reader)?;

    let header = StreamHeader {
        width: decoder.width(),
        height: decoder.height(),
        global_palette: decoder.global_palette().map(<[u8]>::to_vec),
        background: decoder.bg_color().and_then(|i| u8::try_from(i).ok()),
    };

    let mut count = 0usize;
    let mut indices = Vec::new();
    loop {
        let descriptor = match decoder.next_frame_info()? {
            Some(frame) => frame.clone(),
            None => break,
        };

        indices.clear();
        indices.resize(descriptor.width as usize * descriptor.height as usize, 0);
        if !indices.is_empty() && !decoder.fill_buffer(&mut indices)? {
            log::debug!("record {} ended before its image data was complete", count);
        }

        let palette: &[u8] = match (&descriptor.palette, &header.global_palette) {
            (Some(local), _) => local,
            (None, Some(global)) => global,
            (None, None) => &[],
        };
        let record = SubImage {
            canvas_width: header.width,
            canvas_height: header.height,
            left: descriptor.left,
            top: descriptor.top,
            width: descriptor.width,
            height: descriptor.height,
            interlaced: descriptor.interlaced,
            disposal: descriptor.dispose.into(),
            transparent: descriptor.transparent,
            palette,
            indices: &indices,
            delay: descriptor.delay,
        };
        visit(&header, &record)?;
        count += 1;
    }

    Ok((header, count))
}
