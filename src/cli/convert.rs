//! Conversion commands (encode, decode, compile)

use std::path::Path;
use std::process::ExitCode;

use log::debug;

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::bank::pad_to_multiple;
use crate::config::CliOverrides;
use crate::indexed_png::{read_indexed_png, render_rgba, write_indexed_png};
use crate::output::{generate_output_path, save_png, scale_image, write_chr};
use crate::palette::DisplayPalette;
use crate::sheet::{image_to_sheet, sheet_to_image, SheetError, TruncationPolicy};
use crate::tile::encode;
use crate::tile_text::parse_sheet;

/// Execute the encode command
pub fn run_encode(
    input: &Path,
    output: Option<&Path>,
    check: bool,
    pad: Option<u32>,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { pad_to: pad, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let png = match read_indexed_png(input) {
        Ok(png) => png,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let (width, height) = (png.image.width(), png.image.height());

    let sheet = match image_to_sheet(&png.image) {
        Ok(sheet) => sheet,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            if matches!(e, SheetError::PaletteOverflow { .. }) {
                eprintln!("Hint: Reduce the image to 4 colours so every pixel uses palette index 0-3");
            }
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let tile_count = png.image.tile_count();

    if check {
        println!("OK: {} - {}x{}, {} tiles", input.display(), width, height, tile_count);
        return ExitCode::from(EXIT_SUCCESS);
    }

    let data = pad_to_multiple(&sheet, config.banks.pad_to as usize);
    if data.len() != sheet.len() {
        debug!("Padded {} bytes to {}", sheet.len(), data.len());
    }

    let output_path = generate_output_path(input, output, "chr");
    if let Err(e) = write_chr(&data, &output_path) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Converted {} tiles ({} bytes) -> {}", tile_count, data.len(), output_path.display());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the decode command
pub fn run_decode(
    input: &Path,
    output: Option<&Path>,
    columns: Option<u32>,
    palette: Option<&str>,
    scale: Option<u32>,
    indexed: bool,
    strict: bool,
    config_path: Option<&Path>,
) -> ExitCode {
    if let Some(palette) = palette {
        if let Err(e) = palette.parse::<DisplayPalette>() {
            eprintln!("Error: Invalid --palette '{}': {}", palette, e);
            eprintln!("Built-in palettes: {}", DisplayPalette::builtin_names().join(", "));
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let overrides = CliOverrides {
        columns,
        scale,
        indexed: indexed.then_some(true),
        palette: palette.map(String::from),
        strict: strict.then_some(true),
        ..Default::default()
    };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let data = match std::fs::read(input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let policy = TruncationPolicy::from_strict(config.sheet.strict);
    let decoded = match sheet_to_image(&data, config.decode.columns, policy) {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            if matches!(e, SheetError::MalformedSheet { .. }) {
                eprintln!("Hint: Run without --strict to decode the complete tiles");
            }
            return ExitCode::from(EXIT_ERROR);
        }
    };
    for warning in &decoded.warnings {
        eprintln!("Warning: {}", warning);
    }

    println!("Input: {} ({} tiles, {} bytes)", input.display(), decoded.tile_count, data.len());

    let display = config.display_palette();
    let output_path = generate_output_path(input, output, "png");
    let scale = config.decode.scale;

    let (out_width, out_height) = if config.decode.indexed && scale == 1 {
        if let Err(e) = write_indexed_png(&output_path, &decoded.image, &display) {
            eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        (decoded.image.width(), decoded.image.height())
    } else {
        if config.decode.indexed {
            eprintln!("Warning: Indexed output cannot be scaled, writing RGB at scale {}", scale);
        }
        let rgba = scale_image(render_rgba(&decoded.image, &display), scale as u8);
        if let Err(e) = save_png(&rgba, &output_path) {
            eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        rgba.dimensions()
    };

    println!("Output: {} ({}x{})", output_path.display(), out_width, out_height);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the compile command
pub fn run_compile(
    input: &Path,
    output: &Path,
    pad: Option<u32>,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { pad_to: pad, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let text = match std::fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let tiles = match parse_sheet(&text) {
        Ok(tiles) => tiles,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let sheet: Vec<u8> = tiles.iter().flat_map(|tile| encode(tile).0).collect();
    let data = pad_to_multiple(&sheet, config.banks.pad_to as usize);

    if let Err(e) = write_chr(&data, output) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Compiled {} tiles ({} bytes) -> {}", tiles.len(), data.len(), output.display());
    ExitCode::from(EXIT_SUCCESS)
}
