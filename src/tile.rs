//! Single-tile codec for the NES 2bpp planar CHR format
//!
//! A tile is an 8x8 grid of 2-bit pixel values. Its packed form is 16 bytes:
//!
//! | Bytes | Contents |
//! |-------|----------|
//! | 0-7   | plane 0: bit 0 of each pixel, one byte per row |
//! | 8-15  | plane 1: bit 1 of each pixel, one byte per row |
//!
//! Within a row byte, bit 7 holds the leftmost pixel. A pixel value is
//! reconstructed as `(plane1_bit << 1) | plane0_bit`.

use thiserror::Error;

/// Width and height of a tile in pixels
pub const TILE_SIZE: usize = 8;

/// Number of bytes in a packed tile
pub const PACKED_TILE_BYTES: usize = 16;

/// Largest pixel value a 2bpp tile can hold
pub const MAX_PIXEL_VALUE: u8 = 3;

/// Error type for single-tile conversions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Input rows do not form an 8x8 grid
    #[error("malformed tile: expected 8 rows of 8 pixels, got {rows} rows{}", bad_row_suffix(.bad_row))]
    MalformedTile {
        /// Number of rows supplied
        rows: usize,
        /// First row with the wrong length, as (row index, length)
        bad_row: Option<(usize, usize)>,
    },
    /// A pixel value does not fit in two bits
    #[error("pixel ({x},{y}) has value {value}, must be 0-3")]
    OutOfRangeValue { x: usize, y: usize, value: u8 },
    /// Packed input is not exactly 16 bytes
    #[error("malformed packed tile: expected 16 bytes, got {len}")]
    MalformedPackedTile { len: usize },
}

fn bad_row_suffix(bad_row: &Option<(usize, usize)>) -> String {
    match bad_row {
        Some((row, len)) => format!(" (row {} has {} pixels)", row, len),
        None => String::new(),
    }
}

/// An 8x8 grid of pixel values, each in `0..=3`.
///
/// The grid shape is fixed by the type; the value range is checked by every
/// constructor, so a `Tile` always holds encodable pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    pixels: [[u8; TILE_SIZE]; TILE_SIZE],
}

impl Tile {
    /// A tile with every pixel set to 0.
    pub const BLANK: Tile = Tile { pixels: [[0; TILE_SIZE]; TILE_SIZE] };

    /// Build a tile from a fixed-size grid, rejecting values above 3.
    pub fn new(pixels: [[u8; TILE_SIZE]; TILE_SIZE]) -> Result<Self, TileError> {
        for (y, row) in pixels.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value > MAX_PIXEL_VALUE {
                    return Err(TileError::OutOfRangeValue { x, y, value });
                }
            }
        }
        Ok(Self { pixels })
    }

    /// Build a tile from untyped rows (e.g. parsed text or nested vectors).
    ///
    /// Fails with [`TileError::MalformedTile`] unless there are exactly 8 rows
    /// of exactly 8 values, and with [`TileError::OutOfRangeValue`] for any
    /// value above 3.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, TileError> {
        if rows.len() != TILE_SIZE {
            return Err(TileError::MalformedTile { rows: rows.len(), bad_row: None });
        }
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != TILE_SIZE {
                return Err(TileError::MalformedTile {
                    rows: rows.len(),
                    bad_row: Some((y, row.len())),
                });
            }
            pixels[y].copy_from_slice(row);
        }
        Self::new(pixels)
    }

    /// A tile filled with a single value.
    pub fn solid(value: u8) -> Result<Self, TileError> {
        Self::new([[value; TILE_SIZE]; TILE_SIZE])
    }

    /// Pixel value at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is 8 or more.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    /// The rows of the tile, top to bottom.
    pub fn rows(&self) -> &[[u8; TILE_SIZE]; TILE_SIZE] {
        &self.pixels
    }
}

/// A tile in packed 2bpp planar form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedTile(pub [u8; PACKED_TILE_BYTES]);

impl PackedTile {
    /// Copy a packed tile out of a byte slice that must be exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TileError> {
        let array: [u8; PACKED_TILE_BYTES] = bytes
            .try_into()
            .map_err(|_| TileError::MalformedPackedTile { len: bytes.len() })?;
        Ok(Self(array))
    }

    /// The 16 packed bytes.
    pub fn as_bytes(&self) -> &[u8; PACKED_TILE_BYTES] {
        &self.0
    }

    /// Plane 0 (low bits), one byte per row.
    pub fn plane0(&self) -> &[u8] {
        &self.0[..TILE_SIZE]
    }

    /// Plane 1 (high bits), one byte per row.
    pub fn plane1(&self) -> &[u8] {
        &self.0[TILE_SIZE..]
    }
}

/// Pack a tile into its 16-byte planar form.
pub fn encode(tile: &Tile) -> PackedTile {
    let mut packed = [0u8; PACKED_TILE_BYTES];
    for (y, row) in tile.pixels.iter().enumerate() {
        let mut b0 = 0u8;
        let mut b1 = 0u8;
        for (x, &pixel) in row.iter().enumerate() {
            let bit = 7 - x;
            b0 |= (pixel & 1) << bit;
            b1 |= ((pixel >> 1) & 1) << bit;
        }
        packed[y] = b0;
        packed[y + TILE_SIZE] = b1;
    }
    PackedTile(packed)
}

/// Validate untyped rows and pack them in one step.
pub fn encode_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<PackedTile, TileError> {
    Tile::from_rows(rows).map(|tile| encode(&tile))
}

/// Unpack a 16-byte planar tile. Every result value is in `0..=3`.
pub fn decode(packed: &PackedTile) -> Tile {
    let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (y, row) in pixels.iter_mut().enumerate() {
        let b0 = packed.0[y];
        let b1 = packed.0[y + TILE_SIZE];
        for (x, pixel) in row.iter_mut().enumerate() {
            let bit = 7 - x;
            *pixel = (((b1 >> bit) & 1) << 1) | ((b0 >> bit) & 1);
        }
    }
    Tile { pixels }
}

/// Unpack a tile from a byte slice that must be exactly 16 bytes long.
pub fn decode_slice(bytes: &[u8]) -> Result<Tile, TileError> {
    PackedTile::from_slice(bytes).map(|packed| decode(&packed))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mixed rows covering every value at every column
    fn reference_pattern() -> [[u8; 8]; 8] {
        [
            [0, 0, 1, 1, 2, 2, 3, 3],
            [0, 1, 2, 3, 0, 1, 2, 3],
            [3, 2, 1, 0, 3, 2, 1, 0],
            [1, 1, 1, 1, 2, 2, 2, 2],
            [0, 0, 0, 0, 3, 3, 3, 3],
            [3, 0, 3, 0, 3, 0, 3, 0],
            [1, 2, 1, 2, 1, 2, 1, 2],
            [0, 3, 0, 3, 0, 3, 0, 3],
        ]
    }

    #[test]
    fn test_encode_reference_pattern() {
        let tile = Tile::new(reference_pattern()).unwrap();
        let packed = encode(&tile);
        assert_eq!(
            packed.as_bytes(),
            &[
                0x33, 0x55, 0xAA, 0xF0, 0x0F, 0xAA, 0xAA, 0x55, // plane 0
                0x0F, 0x33, 0xCC, 0x0F, 0x0F, 0xAA, 0x55, 0x55, // plane 1
            ]
        );
    }

    #[test]
    fn test_reference_pattern_round_trip() {
        let tile = Tile::new(reference_pattern()).unwrap();
        assert_eq!(decode(&encode(&tile)), tile);
        assert_eq!(decode(&encode(&tile)).rows(), &reference_pattern());
    }

    #[test]
    fn test_all_zeros_encodes_to_zero_bytes() {
        let packed = encode(&Tile::BLANK);
        assert_eq!(packed.as_bytes(), &[0u8; 16]);
        assert_eq!(decode(&packed), Tile::BLANK);
    }

    #[test]
    fn test_all_threes_encodes_to_ff_bytes() {
        let tile = Tile::solid(3).unwrap();
        let packed = encode(&tile);
        assert_eq!(packed.as_bytes(), &[0xFFu8; 16]);
        assert!(decode(&packed).rows().iter().flatten().all(|&p| p == 3));
    }

    #[test]
    fn test_solid_one_and_two_use_single_plane() {
        let ones = encode(&Tile::solid(1).unwrap());
        assert_eq!(ones.plane0(), &[0xFF; 8]);
        assert_eq!(ones.plane1(), &[0x00; 8]);

        let twos = encode(&Tile::solid(2).unwrap());
        assert_eq!(twos.plane0(), &[0x00; 8]);
        assert_eq!(twos.plane1(), &[0xFF; 8]);
    }

    #[test]
    fn test_leftmost_pixel_is_msb() {
        let mut pixels = [[0u8; 8]; 8];
        pixels[0][0] = 1;
        pixels[7][7] = 2;
        let packed = encode(&Tile::new(pixels).unwrap());
        assert_eq!(packed.0[0], 0x80);
        assert_eq!(packed.0[15], 0x01);
        assert_eq!(packed.0.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn test_round_trip_every_byte_value() {
        // Every packed byte value in both planes decodes and re-encodes unchanged
        for value in 0..=255u8 {
            let mut bytes = [0u8; 16];
            for (i, b) in bytes.iter_mut().enumerate() {
                *b = value.wrapping_add((i as u8).wrapping_mul(37));
            }
            let packed = PackedTile(bytes);
            assert_eq!(encode(&decode(&packed)), packed);
        }
    }

    #[test]
    fn test_new_rejects_value_four() {
        let mut pixels = [[0u8; 8]; 8];
        pixels[2][5] = 4;
        assert_eq!(Tile::new(pixels), Err(TileError::OutOfRangeValue { x: 5, y: 2, value: 4 }));
    }

    #[test]
    fn test_encode_rows_rejects_out_of_range() {
        let mut rows = vec![vec![0u8; 8]; 8];
        rows[0][0] = 4;
        let err = encode_rows(&rows).unwrap_err();
        assert!(matches!(err, TileError::OutOfRangeValue { value: 4, .. }));
        assert_eq!(err.to_string(), "pixel (0,0) has value 4, must be 0-3");
    }

    #[test]
    fn test_from_rows_wrong_row_count() {
        let rows = vec![vec![0u8; 8]; 7];
        assert_eq!(
            Tile::from_rows(&rows),
            Err(TileError::MalformedTile { rows: 7, bad_row: None })
        );
    }

    #[test]
    fn test_from_rows_ragged_row() {
        let mut rows = vec![vec![0u8; 8]; 8];
        rows[3] = vec![1, 2, 3];
        let err = Tile::from_rows(&rows).unwrap_err();
        assert_eq!(err, TileError::MalformedTile { rows: 8, bad_row: Some((3, 3)) });
        assert!(err.to_string().contains("row 3 has 3 pixels"));
    }

    #[test]
    fn test_decode_slice_wrong_length() {
        assert_eq!(decode_slice(&[0u8; 15]), Err(TileError::MalformedPackedTile { len: 15 }));
        assert_eq!(decode_slice(&[0u8; 17]), Err(TileError::MalformedPackedTile { len: 17 }));
        assert_eq!(decode_slice(&[0u8; 16]), Ok(Tile::BLANK));
    }

    #[test]
    fn test_encode_always_sixteen_bytes() {
        for value in 0..=3 {
            let packed = encode(&Tile::solid(value).unwrap());
            assert_eq!(packed.as_bytes().len(), PACKED_TILE_BYTES);
        }
    }
}
