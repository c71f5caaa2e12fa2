//! CHR bank sizing and tile patching
//!
//! Cartridge CHR ROM is addressed in 1 KiB banks (64 tiles); a full PPU
//! pattern table is 4 KiB. These helpers pad sheets to bank boundaries and
//! copy individual tiles between sheets by index.

use thiserror::Error;

use crate::tile::PACKED_TILE_BYTES;

/// Bytes in one 1 KiB CHR bank.
pub const BANK_SIZE: usize = 1024;

/// Bytes in one PPU pattern table (256 tiles).
pub const PATTERN_TABLE_SIZE: usize = 4096;

/// Tiles per 1 KiB bank.
pub const TILES_PER_BANK: usize = BANK_SIZE / PACKED_TILE_BYTES;

/// Largest sheet [`patch_tiles`] will grow a destination to (2 MiB of CHR ROM).
pub const MAX_CHR_SIZE: usize = 2048 * BANK_SIZE;

/// Tiles in a [`MAX_CHR_SIZE`] sheet.
pub const MAX_CHR_TILES: usize = MAX_CHR_SIZE / PACKED_TILE_BYTES;

/// Error type for bank operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// Mapping references a tile past the end of the source sheet
    #[error("source tile {index} out of range, source has {count} tiles")]
    SourceTileOutOfRange { index: usize, count: usize },
    /// Mapping targets a tile past the largest sheet a patch may produce
    #[error("destination tile {index} out of range, max is {}", MAX_CHR_TILES - 1)]
    DestTileOutOfRange { index: usize },
    /// Mapping string is not `SRC:DST`
    #[error("invalid tile mapping '{0}', expected SRC:DST (e.g. 9:0x20)")]
    InvalidMapping(String),
    /// Tile index is not a decimal, `0x` or `$` hex number
    #[error("invalid tile index '{0}'")]
    InvalidIndex(String),
}

/// Copy of `data` zero-padded to at least `size` bytes.
///
/// Data already `size` bytes or longer is returned unchanged.
pub fn pad_to(data: &[u8], size: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    if out.len() < size {
        out.resize(size, 0);
    }
    out
}

/// Copy of `data` zero-padded up to the next multiple of `multiple`.
///
/// A `multiple` of 0 disables padding.
pub fn pad_to_multiple(data: &[u8], multiple: usize) -> Vec<u8> {
    if multiple == 0 {
        return data.to_vec();
    }
    pad_to(data, data.len().div_ceil(multiple) * multiple)
}

/// Size in 1 KiB banks, fractional for partial banks.
pub fn bank_count(len: usize) -> f64 {
    len as f64 / BANK_SIZE as f64
}

/// Copy tiles from `src` into a copy of `dst`.
///
/// Each `(src_index, dst_index)` pair copies one 16-byte tile. The
/// destination grows with zero bytes when a target index lies past its end,
/// up to [`MAX_CHR_TILES`] tiles; indices beyond that are rejected rather
/// than grown into. Neither input is modified.
pub fn patch_tiles(dst: &[u8], src: &[u8], mapping: &[(usize, usize)]) -> Result<Vec<u8>, BankError> {
    let src_count = src.len() / PACKED_TILE_BYTES;
    let mut out = dst.to_vec();

    for &(src_index, dst_index) in mapping {
        if src_index >= src_count {
            return Err(BankError::SourceTileOutOfRange { index: src_index, count: src_count });
        }
        if dst_index >= MAX_CHR_TILES {
            return Err(BankError::DestTileOutOfRange { index: dst_index });
        }
        let src_start = src_index * PACKED_TILE_BYTES;
        let dst_start = dst_index * PACKED_TILE_BYTES;
        let dst_end = dst_start + PACKED_TILE_BYTES;
        if out.len() < dst_end {
            out.resize(dst_end, 0);
        }
        out[dst_start..dst_end].copy_from_slice(&src[src_start..src_start + PACKED_TILE_BYTES]);
    }
    Ok(out)
}

/// Parse a tile index: decimal, `0x`-prefixed hex, or `$`-prefixed hex.
pub fn parse_tile_index(text: &str) -> Result<usize, BankError> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_prefix('$') {
        usize::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| BankError::InvalidIndex(text.to_string()))
}

/// Parse a `SRC:DST` tile mapping such as `9:0x20` or `$0A:$20`.
pub fn parse_tile_mapping(text: &str) -> Result<(usize, usize), BankError> {
    let (src, dst) = text.split_once(':').ok_or_else(|| BankError::InvalidMapping(text.to_string()))?;
    Ok((parse_tile_index(src)?, parse_tile_index(dst)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_tiles(count: usize) -> Vec<u8> {
        (0..count).flat_map(|i| [i as u8; PACKED_TILE_BYTES]).collect()
    }

    #[test]
    fn test_pad_to() {
        assert_eq!(pad_to(&[1, 2], 4), vec![1, 2, 0, 0]);
        assert_eq!(pad_to(&[1, 2, 3], 2), vec![1, 2, 3]);
        assert_eq!(pad_to(&[], PATTERN_TABLE_SIZE).len(), 4096);
    }

    #[test]
    fn test_pad_to_multiple() {
        assert_eq!(pad_to_multiple(&[7; 1000], BANK_SIZE).len(), 1024);
        assert_eq!(pad_to_multiple(&[7; 1024], BANK_SIZE).len(), 1024);
        assert_eq!(pad_to_multiple(&[7; 1025], BANK_SIZE).len(), 2048);
        assert_eq!(pad_to_multiple(&[7; 5], 0), vec![7; 5]);
        assert!(pad_to_multiple(&[], BANK_SIZE).is_empty());
    }

    #[test]
    fn test_bank_count() {
        assert_eq!(bank_count(0), 0.0);
        assert_eq!(bank_count(8192), 8.0);
        assert_eq!(bank_count(1536), 1.5);
        assert_eq!(TILES_PER_BANK, 64);
    }

    #[test]
    fn test_patch_tiles_copies_and_preserves_inputs() {
        let src = numbered_tiles(4);
        let dst = vec![0xEEu8; 4 * PACKED_TILE_BYTES];
        let out = patch_tiles(&dst, &src, &[(3, 0), (1, 2)]).unwrap();

        assert_eq!(&out[0..16], &[3u8; 16]);
        assert_eq!(&out[16..32], &[0xEEu8; 16]);
        assert_eq!(&out[32..48], &[1u8; 16]);
        assert_eq!(dst, vec![0xEEu8; 64]);
        assert_eq!(src, numbered_tiles(4));
    }

    #[test]
    fn test_patch_tiles_grows_destination() {
        let src = numbered_tiles(2);
        let out = patch_tiles(&[], &src, &[(1, 5)]).unwrap();
        assert_eq!(out.len(), 6 * PACKED_TILE_BYTES);
        assert!(out[..80].iter().all(|&b| b == 0));
        assert_eq!(&out[80..96], &[1u8; 16]);
    }

    #[test]
    fn test_patch_tiles_source_out_of_range() {
        let src = numbered_tiles(2);
        assert_eq!(
            patch_tiles(&[], &src, &[(0, 0), (2, 1)]),
            Err(BankError::SourceTileOutOfRange { index: 2, count: 2 })
        );
        // A trailing partial tile in the source does not count
        let mut short = numbered_tiles(1);
        short.extend_from_slice(&[9; 8]);
        assert!(patch_tiles(&[], &short, &[(1, 0)]).is_err());
    }

    #[test]
    fn test_patch_tiles_dest_out_of_range() {
        let dst = vec![1u8; 2 * PACKED_TILE_BYTES];
        let src = vec![7u8; PACKED_TILE_BYTES];

        // Would wrap to tile 0 with unchecked arithmetic
        assert_eq!(
            patch_tiles(&dst, &src, &[(0, 1 << 60)]),
            Err(BankError::DestTileOutOfRange { index: 1 << 60 })
        );
        assert_eq!(
            patch_tiles(&dst, &src, &[(0, usize::MAX)]),
            Err(BankError::DestTileOutOfRange { index: usize::MAX })
        );
        assert_eq!(
            patch_tiles(&dst, &src, &[(0, MAX_CHR_TILES)]),
            Err(BankError::DestTileOutOfRange { index: MAX_CHR_TILES })
        );
        assert_eq!(dst, vec![1u8; 32]);
    }

    #[test]
    fn test_patch_tiles_last_allowed_tile() {
        let src = vec![7u8; PACKED_TILE_BYTES];
        let out = patch_tiles(&[], &src, &[(0, MAX_CHR_TILES - 1)]).unwrap();
        assert_eq!(out.len(), MAX_CHR_SIZE);
        assert_eq!(&out[MAX_CHR_SIZE - 16..], &[7u8; 16]);
    }

    #[test]
    fn test_parse_tile_index_formats() {
        assert_eq!(parse_tile_index("9"), Ok(9));
        assert_eq!(parse_tile_index("0x20"), Ok(32));
        assert_eq!(parse_tile_index("$1F"), Ok(31));
        assert_eq!(parse_tile_index(" 12 "), Ok(12));
        assert!(matches!(parse_tile_index("0xZZ"), Err(BankError::InvalidIndex(_))));
        assert!(matches!(parse_tile_index("-1"), Err(BankError::InvalidIndex(_))));
    }

    #[test]
    fn test_parse_tile_mapping() {
        assert_eq!(parse_tile_mapping("9:0x20"), Ok((9, 32)));
        assert_eq!(parse_tile_mapping("$0A:$20"), Ok((10, 32)));
        assert_eq!(
            parse_tile_mapping("9-20"),
            Err(BankError::InvalidMapping("9-20".to_string()))
        );
        assert!(parse_tile_mapping("9:").is_err());
    }
}
