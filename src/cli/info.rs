//! Inspection commands (info, dump)

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::bank::parse_tile_index;
use crate::indexed_png::{describe_color_type, inspect_png_file, read_indexed_png};
use crate::sheet::tiles;
use crate::tile::{decode, MAX_PIXEL_VALUE, PACKED_TILE_BYTES, TILE_SIZE};
use crate::tile_text::format_tile;

/// Execute the info command
pub fn run_info(input: &Path) -> ExitCode {
    let info = match inspect_png_file(input) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    println!("Image: {}", input.display());
    println!("  Size: {}x{} pixels", info.width, info.height);
    println!("  Mode: {} ({}-bit)", describe_color_type(info.color_type), info.bit_depth);

    if info.is_indexed() {
        let png = match read_indexed_png(input) {
            Ok(png) => png,
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        let used: Vec<u8> = png.image.distinct_values().into_iter().collect();
        println!("  Unique palette indices: {:?}", used);
        println!("  Palette colors (RGB):");
        for &index in &used {
            if let Some([r, g, b]) = png.palette.get(index as usize) {
                println!("    [{}] = ({}, {}, {}) #{:02x}{:02x}{:02x}", index, r, g, b, r, g, b);
            }
        }
        let overflow: Vec<u8> = used.iter().copied().filter(|&v| v > MAX_PIXEL_VALUE).collect();
        if !overflow.is_empty() {
            println!("  WARNING: Indices {:?} exceed 3, image cannot be encoded as CHR", overflow);
        }
    } else {
        println!("  WARNING: Not an indexed image, encode requires indexed (palette) colour");
    }

    let tile = TILE_SIZE as u32;
    if info.width % tile == 0 && info.height % tile == 0 {
        let tiles_x = info.width / tile;
        let tiles_y = info.height / tile;
        let total = tiles_x as usize * tiles_y as usize;
        println!(
            "  Tiles: {}x{} = {} tiles ({} bytes)",
            tiles_x,
            tiles_y,
            total,
            total * PACKED_TILE_BYTES
        );
    } else {
        println!("  WARNING: Dimensions not multiple of 8, cannot tile");
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the dump command
pub fn run_dump(input: &Path, tile: Option<&str>) -> ExitCode {
    let data = match std::fs::read(input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let count = data.len() / PACKED_TILE_BYTES;
    if count == 0 {
        eprintln!("Error: {}: no complete tiles ({} bytes)", input.display(), data.len());
        return ExitCode::from(EXIT_ERROR);
    }
    let remainder = data.len() % PACKED_TILE_BYTES;
    if remainder != 0 {
        eprintln!("Warning: Ignoring {} trailing bytes after tile {}", remainder, count - 1);
    }

    let selected = match tile {
        Some(text) => {
            let index = match parse_tile_index(text) {
                Ok(index) => index,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            if index >= count {
                eprintln!("Error: Tile {} out of range, {} has {} tiles", index, input.display(), count);
                return ExitCode::from(EXIT_ERROR);
            }
            Some(index)
        }
        None => None,
    };

    for (index, packed) in tiles(&data).enumerate() {
        if selected.is_some_and(|s| s != index) {
            continue;
        }
        if selected.is_none() && index > 0 {
            println!();
        }
        println!("# ${:02X}", index);
        print!("{}", format_tile(&decode(&packed)));
    }

    ExitCode::from(EXIT_SUCCESS)
}
