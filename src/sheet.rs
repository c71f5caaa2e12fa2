//! Whole-image conversion between indexed rasters and CHR tile sheets
//!
//! An [`IndexedImage`] whose dimensions are multiples of 8 decomposes into
//! tiles in raster tile order: left to right within a tile row, then tile
//! rows top to bottom. A tile sheet is those tiles packed and concatenated
//! with no header.

use rayon::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::tile::{decode, encode, PackedTile, Tile, TileError, MAX_PIXEL_VALUE, PACKED_TILE_BYTES, TILE_SIZE};

/// Error type for sheet-level conversions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// Image width or height is not a multiple of 8
    #[error("image is {width}x{height}, width and height must be multiples of 8")]
    InvalidDimensions { width: u32, height: u32 },
    /// A pixel index does not fit the 4-colour tile palette
    #[error(
        "pixel ({x},{y}) uses palette index {value}, max allowed is 3 (out-of-range indices: {})",
        format_values(.distinct)
    )]
    PaletteOverflow {
        /// First offending value in raster order
        value: u8,
        x: u32,
        y: u32,
        /// Every distinct out-of-range value in the image, ascending
        distinct: Vec<u8>,
    },
    /// Sheet length is not a multiple of 16 and truncation is disabled
    #[error("CHR data size {len} is not a multiple of 16")]
    MalformedSheet { len: usize },
    /// Sheet holds no complete tile
    #[error("CHR data is empty")]
    EmptySheet,
    /// Tile columns per row must be at least 1
    #[error("columns per row must be at least 1")]
    InvalidColumns,
    /// Tile grid does not fit in a raster of [`MAX_IMAGE_PIXELS`]
    #[error("{columns}x{rows} tile grid is too large to decode (max {} pixels)", MAX_IMAGE_PIXELS)]
    ImageTooLarge { columns: u32, rows: usize },
    /// Pixel buffer does not match the declared dimensions
    #[error("pixel buffer has {len} values, expected {expected} for {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, len: usize, expected: usize },
    /// Single-tile conversion failed
    #[error(transparent)]
    Tile(#[from] TileError),
}

fn format_values(values: &[u8]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Largest raster `sheet_to_image` will allocate, in pixels (16384x16384).
pub const MAX_IMAGE_PIXELS: usize = 1 << 28;

/// What to do with trailing bytes that do not form a whole tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Reject the sheet with [`SheetError::MalformedSheet`]
    Strict,
    /// Drop the trailing bytes, decode the complete tiles, report a warning
    #[default]
    Truncate,
}

impl TruncationPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Truncate
        }
    }
}

/// Non-fatal conditions recovered from while decoding a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetWarning {
    /// Trailing partial tile was dropped
    Truncated { original_len: usize, kept_len: usize },
}

impl std::fmt::Display for SheetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetWarning::Truncated { original_len, kept_len } => write!(
                f,
                "CHR data size {} is not a multiple of 16, truncated to {} bytes",
                original_len, kept_len
            ),
        }
    }
}

/// A raster of 2-bit palette indices, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IndexedImage {
    /// A blank image filled with index 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; width as usize * height as usize] }
    }

    /// Wrap an existing row-major pixel buffer.
    ///
    /// Values are not range-checked here; [`image_to_sheet`] reports any
    /// index above 3 so that callers see every offending value at once.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SheetError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SheetError::DimensionMismatch { width, height, len: pixels.len(), expected });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel index at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.offset(x, y)])
        } else {
            None
        }
    }

    /// Set the pixel index at `(x, y)`. Writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            let offset = self.offset(x, y);
            self.pixels[offset] = value;
        }
    }

    /// Number of whole tile columns.
    pub fn tiles_x(&self) -> u32 {
        self.width / TILE_SIZE as u32
    }

    /// Number of whole tile rows.
    pub fn tiles_y(&self) -> u32 {
        self.height / TILE_SIZE as u32
    }

    /// Number of whole tiles covered by the image.
    pub fn tile_count(&self) -> usize {
        self.tiles_x() as usize * self.tiles_y() as usize
    }

    /// Whether both dimensions are multiples of the tile size.
    pub fn is_tile_aligned(&self) -> bool {
        self.width % TILE_SIZE as u32 == 0 && self.height % TILE_SIZE as u32 == 0
    }

    /// Sorted set of distinct pixel indices used.
    pub fn distinct_values(&self) -> BTreeSet<u8> {
        self.pixels.iter().copied().collect()
    }

    /// Extract the 8x8 block at tile coordinates `(tx, ty)`.
    ///
    /// Returns [`TileError::OutOfRangeValue`] if a pixel in the block is
    /// above 3.
    ///
    /// # Panics
    ///
    /// Panics only if the block lies outside the image.
    pub fn tile_at(&self, tx: u32, ty: u32) -> Result<Tile, TileError> {
        let mut rows = [[0u8; TILE_SIZE]; TILE_SIZE];
        let x0 = tx as usize * TILE_SIZE;
        let y0 = ty as usize * TILE_SIZE;
        let width = self.width as usize;
        for (row, dst) in rows.iter_mut().enumerate() {
            let start = (y0 + row) * width + x0;
            dst.copy_from_slice(&self.pixels[start..start + TILE_SIZE]);
        }
        Tile::new(rows)
    }

    /// Write a tile's pixels at tile coordinates `(tx, ty)`.
    ///
    /// # Panics
    ///
    /// Panics if the block lies outside the image.
    pub fn blit_tile(&mut self, tx: u32, ty: u32, tile: &Tile) {
        let x0 = tx as usize * TILE_SIZE;
        let y0 = ty as usize * TILE_SIZE;
        let width = self.width as usize;
        for (row, src) in tile.rows().iter().enumerate() {
            let start = (y0 + row) * width + x0;
            self.pixels[start..start + TILE_SIZE].copy_from_slice(src);
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Result of decoding a sheet into a raster
#[derive(Debug, Clone)]
pub struct DecodedSheet {
    /// Decoded raster, `columns * 8` wide
    pub image: IndexedImage,
    /// Number of tiles decoded
    pub tile_count: usize,
    /// Recoverable problems encountered
    pub warnings: Vec<SheetWarning>,
}

/// Iterate over the complete packed tiles in a sheet. Trailing bytes are skipped.
pub fn tiles(sheet: &[u8]) -> impl Iterator<Item = PackedTile> + '_ {
    sheet.chunks_exact(PACKED_TILE_BYTES).filter_map(|chunk| PackedTile::from_slice(chunk).ok())
}

/// Check an image for indices that do not fit in 2 bits.
fn check_palette(image: &IndexedImage) -> Result<(), SheetError> {
    let mut first: Option<(u8, u32, u32)> = None;
    let mut distinct = BTreeSet::new();
    for (i, &value) in image.pixels.iter().enumerate() {
        if value > MAX_PIXEL_VALUE {
            distinct.insert(value);
            if first.is_none() {
                let x = (i % image.width as usize) as u32;
                let y = (i / image.width as usize) as u32;
                first = Some((value, x, y));
            }
        }
    }
    match first {
        Some((value, x, y)) => Err(SheetError::PaletteOverflow {
            value,
            x,
            y,
            distinct: distinct.into_iter().collect(),
        }),
        None => Ok(()),
    }
}

/// Pack an indexed image into a CHR tile sheet.
///
/// Tiles are emitted in raster tile order. Fails with
/// [`SheetError::InvalidDimensions`] if either dimension is not a multiple
/// of 8 and with [`SheetError::PaletteOverflow`] if any index exceeds 3.
pub fn image_to_sheet(image: &IndexedImage) -> Result<Vec<u8>, SheetError> {
    if !image.is_tile_aligned() {
        return Err(SheetError::InvalidDimensions { width: image.width, height: image.height });
    }
    check_palette(image)?;

    let tiles_x = image.tiles_x();
    let packed: Vec<PackedTile> = (0..image.tile_count())
        .into_par_iter()
        .map(|i| {
            let tx = (i % tiles_x as usize) as u32;
            let ty = (i / tiles_x as usize) as u32;
            image.tile_at(tx, ty).map(|tile| encode(&tile))
        })
        .collect::<Result<_, _>>()?;

    let mut sheet = Vec::with_capacity(packed.len() * PACKED_TILE_BYTES);
    for tile in &packed {
        sheet.extend_from_slice(tile.as_bytes());
    }
    Ok(sheet)
}

/// Pixel dimensions of a `columns` x `rows` tile grid, if it stays within
/// [`MAX_IMAGE_PIXELS`].
fn raster_size(columns: u32, rows: usize) -> Option<(u32, u32)> {
    let width = columns.checked_mul(TILE_SIZE as u32)?;
    let height = u32::try_from(rows).ok()?.checked_mul(TILE_SIZE as u32)?;
    let pixels = (width as usize).checked_mul(height as usize)?;
    (pixels <= MAX_IMAGE_PIXELS).then_some((width, height))
}

/// Unpack a CHR tile sheet into a raster `columns` tiles wide.
///
/// Tile `i` lands at tile coordinates `(i % columns, i / columns)`; grid
/// cells past the last tile stay 0. A length that is not a multiple of 16
/// is handled according to `policy`.
pub fn sheet_to_image(
    sheet: &[u8],
    columns: u32,
    policy: TruncationPolicy,
) -> Result<DecodedSheet, SheetError> {
    if columns == 0 {
        return Err(SheetError::InvalidColumns);
    }

    let mut warnings = Vec::new();
    let remainder = sheet.len() % PACKED_TILE_BYTES;
    let data = if remainder == 0 {
        sheet
    } else {
        match policy {
            TruncationPolicy::Strict => {
                return Err(SheetError::MalformedSheet { len: sheet.len() });
            }
            TruncationPolicy::Truncate => {
                let kept_len = sheet.len() - remainder;
                warnings.push(SheetWarning::Truncated { original_len: sheet.len(), kept_len });
                &sheet[..kept_len]
            }
        }
    };

    let tile_count = data.len() / PACKED_TILE_BYTES;
    if tile_count == 0 {
        return Err(SheetError::EmptySheet);
    }

    let decoded: Vec<Tile> = data
        .par_chunks_exact(PACKED_TILE_BYTES)
        .map(|chunk| PackedTile::from_slice(chunk).map(|packed| decode(&packed)))
        .collect::<Result<_, _>>()?;

    let rows = tile_count.div_ceil(columns as usize);
    let (width, height) = raster_size(columns, rows)
        .ok_or(SheetError::ImageTooLarge { columns, rows })?;
    let mut image = IndexedImage::new(width, height);
    for (i, tile) in decoded.iter().enumerate() {
        let tx = (i % columns as usize) as u32;
        let ty = (i / columns as usize) as u32;
        image.blit_tile(tx, ty, tile);
    }

    Ok(DecodedSheet { image, tile_count, warnings })
}
