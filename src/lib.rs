//! gifanim - Animated GIF decoding and encoding
//!
//! This library provides functionality to:
//! - Decode GIF streams into fully composited RGBA frames (disposal and interlacing applied)
//! - Encode frame sequences back to palette GIFs through a pluggable quantizer
//! - Configure encoding from `gifanim.toml` and command-line flags

pub mod cli;
pub mod config;
pub mod format;
pub mod frame;
pub mod gif;
pub mod output;
pub mod quantize;
pub mod store;
