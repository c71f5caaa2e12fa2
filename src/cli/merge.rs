//! Merge command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::bank::{pad_to, parse_tile_mapping, patch_tiles, MAX_CHR_SIZE};
use crate::output::write_chr;

fn read_chr(path: &Path) -> Result<Vec<u8>, ExitCode> {
    std::fs::read(path).map_err(|e| {
        eprintln!("Error: Cannot read '{}': {}", path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Execute the merge command
pub fn run_merge(
    source: &Path,
    dest: &Path,
    map: &[String],
    min_size: usize,
    output: Option<&Path>,
) -> ExitCode {
    if min_size > MAX_CHR_SIZE {
        eprintln!("Error: --min-size {} exceeds the maximum CHR size of {} bytes", min_size, MAX_CHR_SIZE);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut mapping = Vec::with_capacity(map.len());
    for entry in map {
        match parse_tile_mapping(entry) {
            Ok(pair) => mapping.push(pair),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let src_data = match read_chr(source) {
        Ok(data) => data,
        Err(code) => return code,
    };
    let dst_data = match read_chr(dest) {
        Ok(data) => data,
        Err(code) => return code,
    };

    let merged = match patch_tiles(&pad_to(&dst_data, min_size), &src_data, &mapping) {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Error: {}: {}", source.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    for (src, dst) in &mapping {
        println!("  Copied tile {:3} (${:02X}) -> tile {:3} (${:02X})", src, src, dst, dst);
    }

    let output_path = output.unwrap_or(dest);
    if let Err(e) = write_chr(&merged, output_path) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!();
    println!("Wrote {} bytes to {}", merged.len(), output_path.display());
    ExitCode::from(EXIT_SUCCESS)
}
