//! Display palettes for rendering CHR tiles
//!
//! CHR data only stores 2-bit indices; the colours come from whatever
//! palette the PPU is using at run time. For previews we map the 4 indices
//! through a [`DisplayPalette`], which can be given as:
//!
//! - a built-in name: `grayscale`, `gameboy`
//! - four NES master palette indices in hex: `0F,29,19,09`
//! - four hex colours: `#000000,#555555,#AAAAAA,#FFFFFF`
//!
//! NES indices and hex colours can be mixed in one list.

use image::Rgba;
use std::str::FromStr;
use thiserror::Error;

/// NES master palette (2C02, NTSC), 64 entries as 0xRRGGBB.
///
/// Entries $0E/$0F, $1E/$1F, $2E/$2F and $3E/$3F are unused and render black.
pub const NES_MASTER_PALETTE: [u32; 64] = [
    // $00-$0F
    0x626262, 0x002E98, 0x1113B1, 0x3A00A4, 0x5C007E, 0x6E0040, 0x6C0700, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xABABAB, 0x0D57FF, 0x3536FF, 0x6B1CFF, 0x980BD5, 0xAF0D7B, 0xAD2521, 0x904400,
    0x646200, 0x317800, 0x088200, 0x007F2A, 0x006E82, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFFFFFF, 0x53AEFF, 0x798DFF, 0xB474FF, 0xE46FFF, 0xF86CCF, 0xF87F77, 0xDD9C35,
    0xB1B50C, 0x7FCA1C, 0x56D445, 0x40D07D, 0x41C1CF, 0x4E4E4E, 0x000000, 0x000000,
    // $30-$3F
    0xFFFFFF, 0xB6DBFF, 0xC5CBFF, 0xDAC2FF, 0xF0C0FF, 0xFABFEB, 0xFAC7C3, 0xEFD4A5,
    0xDFDE96, 0xCAE79B, 0xB7EBAF, 0xAEEAC9, 0xAFE3EA, 0xB5B5B5, 0x000000, 0x000000,
];

/// Names accepted by [`DisplayPalette::builtin`].
const BUILTIN_NAMES: &[&str] = &["grayscale", "gameboy"];

/// Error type for palette parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// Wrong number of comma-separated entries
    #[error("palette must have exactly 4 entries, got {0}")]
    WrongEntryCount(usize),
    /// NES palette index is not valid hex
    #[error("invalid NES palette index '{0}', expected hex 00-3F")]
    InvalidIndex(String),
    /// NES palette index above $3F
    #[error("NES palette index ${0:02X} out of range (00-3F)")]
    IndexOutOfRange(u32),
    /// Hex colour has the wrong number of digits
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidColorLength(usize),
    /// Hex colour contains a non-hex character
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Convert a NES master palette index to an opaque RGBA colour.
///
/// Only the low 6 bits of `index` are used.
pub fn nes_color(index: u8) -> Rgba<u8> {
    let rgb = NES_MASTER_PALETTE[(index & 0x3F) as usize];
    Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF])
}

/// Four colours used to render 2-bit tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPalette(pub [Rgba<u8>; 4]);

impl Default for DisplayPalette {
    fn default() -> Self {
        Self::grayscale()
    }
}

impl DisplayPalette {
    /// Evenly spaced grays, index 0 black to index 3 white.
    pub fn grayscale() -> Self {
        Self([
            Rgba([0, 0, 0, 255]),
            Rgba([85, 85, 85, 255]),
            Rgba([170, 170, 170, 255]),
            Rgba([255, 255, 255, 255]),
        ])
    }

    /// Game Boy green shades, index 0 lightest.
    pub fn gameboy() -> Self {
        Self([
            Rgba([0x9B, 0xBC, 0x0F, 255]),
            Rgba([0x8B, 0xAC, 0x0F, 255]),
            Rgba([0x30, 0x62, 0x30, 255]),
            Rgba([0x0F, 0x38, 0x0F, 255]),
        ])
    }

    /// Look up a built-in palette by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "grayscale" => Some(Self::grayscale()),
            "gameboy" => Some(Self::gameboy()),
            _ => None,
        }
    }

    /// Names of all built-in palettes.
    pub fn builtin_names() -> &'static [&'static str] {
        BUILTIN_NAMES
    }

    /// Build a palette from four NES master palette indices.
    pub fn from_nes_indices(indices: [u8; 4]) -> Self {
        Self(indices.map(nes_color))
    }

    /// Colour for a 2-bit index. Only the low 2 bits are used.
    pub fn color(&self, index: u8) -> Rgba<u8> {
        self.0[(index & 0x03) as usize]
    }

    /// Flat RGB triplets, as stored in a PNG `PLTE` chunk.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|c| [c[0], c[1], c[2]]).collect()
    }
}

impl FromStr for DisplayPalette {
    type Err = PaletteError;

    /// Parse a built-in name or a comma-separated list of 4 entries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(palette) = Self::builtin(trimmed) {
            return Ok(palette);
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(PaletteError::WrongEntryCount(parts.len()));
        }

        let mut colors = [Rgba([0, 0, 0, 255]); 4];
        for (slot, part) in colors.iter_mut().zip(&parts) {
            *slot = parse_entry(part)?;
        }
        Ok(Self(colors))
    }
}

/// Parse one palette entry: `#RGB`/`#RRGGBB` colour or NES index (`0F`, `$0F`, `0x0F`).
fn parse_entry(entry: &str) -> Result<Rgba<u8>, PaletteError> {
    if let Some(hex) = entry.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    let digits = entry
        .strip_prefix('$')
        .or_else(|| entry.strip_prefix("0x"))
        .or_else(|| entry.strip_prefix("0X"))
        .unwrap_or(entry);
    let index = u32::from_str_radix(digits, 16)
        .map_err(|_| PaletteError::InvalidIndex(entry.to_string()))?;
    if index > 0x3F {
        return Err(PaletteError::IndexOutOfRange(index));
    }
    Ok(nes_color(index as u8))
}

/// Parse the digits of a hex colour (without the leading '#').
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, PaletteError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidHex(c));
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).unwrap_or(0);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    match hex.len() {
        // #RGB -> #RRGGBB (doubled digits)
        3 => Ok(Rgba([digit(0) * 17, digit(1) * 17, digit(2) * 17, 255])),
        6 => Ok(Rgba([pair(0), pair(2), pair(4), 255])),
        len => Err(PaletteError::InvalidColorLength(len)),
    }
}
