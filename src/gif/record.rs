//! Sub-image records delivered by the bitstream reader

use crate::format::PixelFormat;

/// How the canvas is prepared after a frame, before the next is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// No disposal specified; treated like [`Disposal::Keep`]
    #[default]
    Unspecified,
    /// Leave the frame in place
    Keep,
    /// Clear the frame's rectangle
    Background,
    /// Restore the canvas to its state before the frame
    Previous,
}

impl From<gif::DisposalMethod> for Disposal {
    fn from(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Any => Disposal::Unspecified,
            gif::DisposalMethod::Keep => Disposal::Keep,
            gif::DisposalMethod::Background => Disposal::Background,
            gif::DisposalMethod::Previous => Disposal::Previous,
        }
    }
}

impl From<Disposal> for gif::DisposalMethod {
    fn from(disposal: Disposal) -> Self {
        match disposal {
            Disposal::Unspecified => gif::DisposalMethod::Any,
            Disposal::Keep => gif::DisposalMethod::Keep,
            Disposal::Background => gif::DisposalMethod::Background,
            Disposal::Previous => gif::DisposalMethod::Previous,
        }
    }
}

/// Logical screen descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamHeader {
    pub width: u16,
    pub height: u16,
    /// Global colour table as `r, g, b` triples
    pub global_palette: Option<Vec<u8>>,
    /// Background colour index into the global table
    pub background: Option<u8>,
}

impl StreamHeader {
    /// Indexed depth implied by the global colour table, if there is one.
    pub fn index_format(&self) -> Option<PixelFormat> {
        self.global_palette.as_ref().map(|p| PixelFormat::indexed_for_entries(p.len() / 3))
    }

    /// Background colour as opaque RGBA, if the index resolves.
    pub fn background_rgba(&self) -> Option<[u8; 4]> {
        let palette = self.global_palette.as_ref()?;
        let i = self.background? as usize * 3;
        let rgb = palette.get(i..i + 3)?;
        Some([rgb[0], rgb[1], rgb[2], u8::MAX])
    }
}

/// One image descriptor with its pixel indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubImage<'a> {
    pub canvas_width: u16,
    pub canvas_height: u16,
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// Rows in `indices` are in interlaced stream order
    pub interlaced: bool,
    pub disposal: Disposal,
    pub transparent: Option<u8>,
    /// Colour table in effect (local, else global) as `r, g, b` triples
    pub palette: &'a [u8],
    /// `width * height` palette indices, rows in stream order
    pub indices: &'a [u8],
    /// Hundredths of a second
    pub delay: u16,
}

impl SubImage<'_> {
    /// Indexed depth implied by this record's colour table.
    pub fn index_format(&self) -> PixelFormat {
        PixelFormat::indexed_for_entries(self.palette.len() / 3)
    }
}
