//! chrtool - NES CHR tile codec and asset pipeline utilities
//!
//! This library provides functionality to:
//! - Convert 8x8 tiles of 2-bit pixels to and from the 16-byte planar CHR format
//! - Convert whole indexed images to and from CHR tile sheets
//! - Read and write indexed PNGs and render previews through display palettes
//! - Validate, pad and patch CHR banks
//! - Compile and dump tiles in a plain-text notation

pub mod bank;
pub mod cli;
pub mod config;
pub mod indexed_png;
pub mod output;
pub mod palette;
pub mod sheet;
pub mod tile;
pub mod tile_text;
pub mod validate;
