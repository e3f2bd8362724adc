//! Decode engine: composites sub-image records into full canvas frames
//!
//! The compositor keeps two canvas-sized RGBA scratch buffers, top-down:
//! `current` holds the visible result and `previous` the snapshot that a
//! restore-to-previous disposal returns to. Both live only as long as the
//! [`Compositor`] and are allocated when the first record arrives.

use std::io::Read;

use super::error::GifError;
use super::record::{Disposal, StreamHeader, SubImage};
use super::stream;
use crate::format::PixelFormat;
use crate::frame::{Frame, CHANNELS};

/// Largest canvas (in bytes) the compositor will allocate
pub const MAX_CANVAS_BYTES: u64 = 512 * 1024 * 1024;

/// Interlace passes as (first row, row step)
const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Result of a successful decode
#[derive(Debug)]
pub struct Decoded {
    pub width: u32,
    pub height: u32,
    /// Index depth of the source stream
    pub source_format: PixelFormat,
    pub frames: Vec<Frame>,
}

/// Decode a complete stream into composited frames.
pub fn decode<R: Read>(reader: R) -> Result<Decoded, GifError> {
    let mut compositor: Option<Compositor> = None;

    let (header, count) = stream::read_records(reader, |header, record| {
        if compositor.is_none() {
            compositor = Some(Compositor::new(header)?);
        }
        match compositor.as_mut() {
            Some(c) => c.composite(header, record),
            None => Ok(()),
        }
    })?;

    let compositor = match compositor {
        Some(c) if count > 0 => c,
        _ => return Err(GifError::NoFrames),
    };
    let source_format =
        header.index_format().or(compositor.first_format).unwrap_or(PixelFormat::Indexed(8));
    let frames = compositor.finish();

    log::debug!("decoded {} records on a {}x{} canvas", count, header.width, header.height);
    Ok(Decoded {
        width: header.width as u32,
        height: header.height as u32,
        source_format,
        frames,
    })
}

/// Canvas scratch state for one decode
struct Scratch {
    current: Vec<u8>,
    previous: Vec<u8>,
}

/// Clipped sub-rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

/// Per-record compositing state machine.
pub(crate) struct Compositor {
    width: usize,
    height: usize,
    scratch: Option<Scratch>,
    records: usize,
    first_format: Option<PixelFormat>,
    frames: Vec<Frame>,
}

impl Compositor {
    pub(crate) fn new(header: &StreamHeader) -> Result<Self, GifError> {
        if header.width == 0 || header.height == 0 {
            return Err(GifError::EmptyCanvas(header.width, header.height));
        }
        let bytes = u64::from(header.width) * u64::from(header.height) * CHANNELS as u64;
        if bytes > MAX_CANVAS_BYTES {
            return Err(GifError::CanvasLimit {
                width: header.width,
                height: header.height,
                bytes,
                limit: MAX_CANVAS_BYTES,
            });
        }
        Ok(Self {
            width: header.width as usize,
            height: header.height as usize,
            scratch: None,
            records: 0,
            first_format: None,
            frames: Vec::new(),
        })
    }

    /// Paint one record, emit its frame, then apply its disposal.
    pub(crate) fn composite(
        &mut self,
        header: &StreamHeader,
        record: &SubImage<'_>,
    ) -> Result<(), GifError> {
        let canvas_len = self.width * self.height * CHANNELS;
        let is_first = self.records == 0;
        if is_first {
            self.first_format = Some(record.index_format());
        }
        if self.scratch.is_none() {
            self.scratch =
                Some(Scratch { current: zeroed(canvas_len)?, previous: zeroed(canvas_len)? });
        }
        let Some(scratch) = self.scratch.as_mut() else {
            return Ok(());
        };

        let rect = clip(record, self.width, self.height);
        paint(&mut scratch.current, self.width, rect, record);

        let frame = Frame::from_top_down(
            self.width as u32,
            self.height as u32,
            copy_of(&scratch.current)?,
            record.delay as f32 / 100.0,
        )?;
        self.frames.push(frame);

        // Nothing exists yet to restore to, so the first frame clears instead
        let (disposal, hole) = if is_first && record.disposal == Disposal::Previous {
            let full = Rect { left: 0, top: 0, width: self.width, height: self.height };
            (Disposal::Background, full)
        } else {
            match record.disposal {
                Disposal::Previous => scratch.current.copy_from_slice(&scratch.previous),
                _ => scratch.previous.copy_from_slice(&scratch.current),
            }
            (record.disposal, rect)
        };

        if disposal == Disposal::Background {
            let fill = match record.transparent {
                Some(_) => [0, 0, 0, 0],
                None => header.background_rgba().unwrap_or([0, 0, 0, 0]),
            };
            fill_rect(&mut scratch.current, self.width, hole, fill);
        }

        log::debug!(
            "record {}: {}x{} at ({}, {}), {:?}{}",
            self.records,
            record.width,
            record.height,
            record.left,
            record.top,
            record.disposal,
            if record.interlaced { ", interlaced" } else { "" }
        );
        self.records += 1;
        Ok(())
    }

    /// Hand over the frames, releasing the scratch canvases.
    pub(crate) fn finish(self) -> Vec<Frame> {
        self.frames
    }
}

fn zeroed(len: usize) -> Result<Vec<u8>, GifError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| GifError::Allocation(len))?;
    buf.resize(len, 0);
    Ok(buf)
}

fn copy_of(canvas: &[u8]) -> Result<Vec<u8>, GifError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(canvas.len()).map_err(|_| GifError::Allocation(canvas.len()))?;
    buf.extend_from_slice(canvas);
    Ok(buf)
}

/// Intersect the record's rectangle with the canvas.
fn clip(record: &SubImage<'_>, width: usize, height: usize) -> Rect {
    let left = (record.left as usize).min(width);
    let top = (record.top as usize).min(height);
    Rect {
        left,
        top,
        width: (record.width as usize).min(width - left),
        height: (record.height as usize).min(height - top),
    }
}

/// Destination row (relative to the record) for each stream row.
pub(crate) fn row_order(height: usize, interlaced: bool) -> Vec<usize> {
    if !interlaced {
        return (0..height).collect();
    }
    INTERLACE_PASSES
        .iter()
        .flat_map(|&(start, step)| (start..height).step_by(step))
        .collect()
}

/// Paint a record's indices into the top-down canvas, skipping transparent pixels.
fn paint(canvas: &mut [u8], canvas_width: usize, rect: Rect, record: &SubImage<'_>) {
    let src_width = record.width as usize;
    let rows = row_order(record.height as usize, record.interlaced);

    for (stream_row, &dest_row) in rows.iter().enumerate() {
        if dest_row >= rect.height {
            continue;
        }
        let Some(src) = record.indices.get(stream_row * src_width..(stream_row + 1) * src_width)
        else {
            break;
        };
        let offset = ((rect.top + dest_row) * canvas_width + rect.left) * CHANNELS;

        for (x, &index) in src.iter().take(rect.width).enumerate() {
            if record.transparent == Some(index) {
                continue;
            }
            let at = offset + x * CHANNELS;
            canvas[at..at + CHANNELS].copy_from_slice(&palette_rgba(record.palette, index));
        }
    }
}

fn palette_rgba(palette: &[u8], index: u8) -> [u8; 4] {
    let i = index as usize * 3;
    match palette.get(i..i + 3) {
        Some(rgb) => [rgb[0], rgb[1], rgb[2], u8::MAX],
        None => [0, 0, 0, u8::MAX],
    }
}

fn fill_rect(canvas: &mut [u8], canvas_width: usize, rect: Rect, rgba: [u8; 4]) {
    for y in rect.top..rect.top + rect.height {
        let start = (y * canvas_width + rect.left) * CHANNELS;
        for px in canvas[start..start + rect.width * CHANNELS].chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
    }
}
