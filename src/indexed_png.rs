//! Indexed-colour PNG input and output
//!
//! The `image` crate expands palette images to RGB on load, which loses the
//! palette indices the CHR encoder needs. Reading and writing indexed PNGs
//! therefore goes through the `png` crate directly with no transformations;
//! RGBA previews are built as `image::RgbaImage`.

use image::RgbaImage;
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::palette::DisplayPalette;
use crate::sheet::{IndexedImage, SheetError};

/// Error type for PNG reading and writing
#[derive(Debug, Error)]
pub enum PngError {
    /// File could not be opened or written
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// PNG stream is corrupt or unsupported by the decoder
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),
    /// PNG encoder rejected the data
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
    /// Image is not palette based
    #[error(
        "image color type is {0}, expected indexed (palette) color; convert to indexed color with exactly 4 colors first"
    )]
    UnsupportedColorType(String),
    /// Indexed image at a bit depth PNG does not allow for palettes
    #[error("unsupported indexed bit depth {0}")]
    UnsupportedBitDepth(u8),
    /// Indexed image has no PLTE chunk
    #[error("image has no palette")]
    MissingPalette,
    /// Decoded buffer did not match the header dimensions
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Header-level facts about a PNG, available for any colour type.
#[derive(Debug, Clone)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub color_type: png::ColorType,
    pub bit_depth: u8,
    /// RGB palette entries, for indexed images
    pub palette: Option<Vec<[u8; 3]>>,
}

impl PngInfo {
    pub fn is_indexed(&self) -> bool {
        self.color_type == png::ColorType::Indexed
    }
}

/// An indexed PNG decoded to raw palette indices.
#[derive(Debug, Clone)]
pub struct IndexedPng {
    /// Palette index per pixel (values may exceed 3 until encoded)
    pub image: IndexedImage,
    /// RGB palette entries from the PLTE chunk
    pub palette: Vec<[u8; 3]>,
    pub bit_depth: u8,
}

fn color_type_name(color_type: png::ColorType) -> &'static str {
    match color_type {
        png::ColorType::Grayscale => "grayscale",
        png::ColorType::Rgb => "RGB",
        png::ColorType::Indexed => "indexed",
        png::ColorType::GrayscaleAlpha => "grayscale+alpha",
        png::ColorType::Rgba => "RGBA",
    }
}

/// Human-readable colour type name.
pub fn describe_color_type(color_type: png::ColorType) -> &'static str {
    color_type_name(color_type)
}

fn palette_entries(raw: &[u8]) -> Vec<[u8; 3]> {
    raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

/// Read only the PNG header and palette.
pub fn inspect_png<R: Read>(reader: R) -> Result<PngInfo, PngError> {
    let decoder = png::Decoder::new(reader);
    let reader = decoder.read_info()?;
    let info = reader.info();
    Ok(PngInfo {
        width: info.width,
        height: info.height,
        color_type: info.color_type,
        bit_depth: info.bit_depth as u8,
        palette: info.palette.as_deref().map(palette_entries),
    })
}

/// Read the header and palette of a PNG file.
pub fn inspect_png_file(path: &Path) -> Result<PngInfo, PngError> {
    inspect_png(BufReader::new(File::open(path)?))
}

/// Decode an indexed PNG stream to palette indices.
///
/// Any other colour type fails with [`PngError::UnsupportedColorType`];
/// there is no quantization fallback.
pub fn decode_indexed_png<R: Read>(reader: R) -> Result<IndexedPng, PngError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let color_type = reader.info().color_type;
    if color_type != png::ColorType::Indexed {
        return Err(PngError::UnsupportedColorType(color_type_name(color_type).to_string()));
    }
    let palette = reader.info().palette.as_deref().map(palette_entries).ok_or(PngError::MissingPalette)?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let depth = frame.bit_depth as u8;
    if !matches!(depth, 1 | 2 | 4 | 8) {
        return Err(PngError::UnsupportedBitDepth(depth));
    }
    debug!(
        "Decoded indexed PNG {}x{} at {} bpp, {} palette entries",
        frame.width,
        frame.height,
        depth,
        palette.len()
    );

    let width = frame.width as usize;
    let height = frame.height as usize;
    let per_byte = 8 / depth as usize;
    let mask = ((1u16 << depth) - 1) as u8;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &buf[y * frame.line_size..(y + 1) * frame.line_size];
        for x in 0..width {
            let byte = row[x / per_byte];
            let shift = 8 - depth as usize * (x % per_byte + 1);
            pixels.push((byte >> shift) & mask);
        }
    }

    let image = IndexedImage::from_pixels(frame.width, frame.height, pixels)?;
    Ok(IndexedPng { image, palette, bit_depth: depth })
}

/// Read an indexed PNG file to palette indices.
pub fn read_indexed_png(path: &Path) -> Result<IndexedPng, PngError> {
    decode_indexed_png(BufReader::new(File::open(path)?))
}

/// Encode 2-bit indices as an indexed PNG at bit depth 2 with a 4-entry palette.
///
/// Pixel indices are written unchanged (masked to 2 bits), so decoding the
/// result reproduces the image exactly.
pub fn encode_indexed_png<W: Write>(
    writer: W,
    image: &IndexedImage,
    palette: &DisplayPalette,
) -> Result<(), PngError> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Two);
    encoder.set_palette(palette.to_rgb_bytes());
    let mut writer = encoder.write_header()?;

    // 4 indices per byte, leftmost pixel in the high bits
    let row_bytes = width.div_ceil(4);
    let mut packed = vec![0u8; row_bytes * height];
    for (y, row) in image.pixels().chunks(width.max(1)).enumerate().take(height) {
        for (x, &index) in row.iter().enumerate() {
            let bit_pos = 3 - (x % 4);
            packed[y * row_bytes + x / 4] |= (index & 0x03) << (bit_pos * 2);
        }
    }

    writer.write_image_data(&packed)?;
    writer.finish()?;
    Ok(())
}

/// Write an indexed PNG file, creating parent directories as needed.
pub fn write_indexed_png(
    path: &Path,
    image: &IndexedImage,
    palette: &DisplayPalette,
) -> Result<(), PngError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    encode_indexed_png(&mut writer, image, palette)?;
    writer.flush()?;
    Ok(())
}

/// Render indices through a display palette as an RGBA image.
pub fn render_rgba(image: &IndexedImage, palette: &DisplayPalette) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        palette.color(image.get(x, y).unwrap_or(0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn checker(width: u32, height: u32) -> IndexedImage {
        let mut image = IndexedImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.set(x, y, ((x / 2 + y) % 4) as u8);
            }
        }
        image
    }

    /// Encode an arbitrary-depth indexed PNG with the `png` crate directly.
    fn raw_indexed_png(width: u32, height: u32, depth: png::BitDepth, data: &[u8], plte: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(depth);
            encoder.set_palette(plte.to_vec());
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_indexed_round_trip() {
        let image = checker(16, 8);
        let mut bytes = Vec::new();
        encode_indexed_png(&mut bytes, &image, &DisplayPalette::grayscale()).unwrap();

        let decoded = decode_indexed_png(Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.image, image);
        assert_eq!(decoded.bit_depth, 2);
        assert_eq!(decoded.palette.len(), 4);
        assert_eq!(decoded.palette[3], [255, 255, 255]);
    }

    #[test]
    fn test_round_trip_width_not_multiple_of_four() {
        let image = checker(6, 3);
        let mut bytes = Vec::new();
        encode_indexed_png(&mut bytes, &image, &DisplayPalette::gameboy()).unwrap();
        assert_eq!(decode_indexed_png(Cursor::new(&bytes)).unwrap().image, image);
    }

    #[test]
    fn test_decode_eight_bit_keeps_high_indices() {
        let plte: Vec<u8> = (0..16u8).flat_map(|i| [i, i, i]).collect();
        let data: Vec<u8> = vec![0, 1, 2, 3, 4, 9, 15, 0];
        let bytes = raw_indexed_png(8, 1, png::BitDepth::Eight, &data, &plte);

        let decoded = decode_indexed_png(Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.bit_depth, 8);
        assert_eq!(decoded.image.pixels(), data.as_slice());
        assert_eq!(decoded.palette.len(), 16);
    }

    #[test]
    fn test_decode_one_and_four_bit() {
        let plte = [0, 0, 0, 255, 255, 255];
        let bytes = raw_indexed_png(8, 1, png::BitDepth::One, &[0b1010_0001], &plte);
        let decoded = decode_indexed_png(Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.image.pixels(), &[1, 0, 1, 0, 0, 0, 0, 1]);

        let plte: Vec<u8> = (0..16u8).flat_map(|i| [i, i, i]).collect();
        let bytes = raw_indexed_png(4, 1, png::BitDepth::Four, &[0x31, 0x2F], &plte);
        let decoded = decode_indexed_png(Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.image.pixels(), &[3, 1, 2, 15]);
    }

    #[test]
    fn test_rgb_png_rejected() {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 8, 8);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0u8; 8 * 8 * 3]).unwrap();
        }
        let err = decode_indexed_png(Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, PngError::UnsupportedColorType(ref t) if t == "RGB"));

        let info = inspect_png(Cursor::new(&bytes)).unwrap();
        assert!(!info.is_indexed());
        assert_eq!(info.palette, None);
    }

    #[test]
    fn test_inspect_indexed() {
        let mut bytes = Vec::new();
        encode_indexed_png(&mut bytes, &checker(8, 16), &DisplayPalette::grayscale()).unwrap();
        let info = inspect_png(Cursor::new(&bytes)).unwrap();
        assert!(info.is_indexed());
        assert_eq!((info.width, info.height, info.bit_depth), (8, 16, 2));
        assert_eq!(info.palette.map(|p| p.len()), Some(4));
    }

    #[test]
    fn test_render_rgba_uses_palette() {
        let mut image = IndexedImage::new(2, 1);
        image.set(1, 0, 3);
        let palette = DisplayPalette::gameboy();
        let rgba = render_rgba(&image, &palette);
        assert_eq!(*rgba.get_pixel(0, 0), palette.color(0));
        assert_eq!(*rgba.get_pixel(1, 0), Rgba([0x0F, 0x38, 0x0F, 255]));
    }

    #[test]
    fn test_write_indexed_png_creates_parent_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("out.png");
        write_indexed_png(&path, &checker(8, 8), &DisplayPalette::grayscale()).unwrap();
        assert_eq!(read_indexed_png(&path).unwrap().image, checker(8, 8));
    }
}
