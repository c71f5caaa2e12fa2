//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod convert;
mod info;
mod merge;
mod validate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::{load_config, merge_cli_overrides, ChrConfig, CliOverrides};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has the `.chr` extension, in any case.
fn is_chr_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("chr"))
}

/// Find all CHR files in a directory (recursively), sorted by path.
pub fn find_chr_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match glob(&format!("{}/**/*", dir.display())) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|p| is_chr_file(p) && p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };

    files.sort();
    files
}

/// Load the effective configuration: file (explicit or discovered), then
/// CLI overrides. Prints the error and returns the exit code on failure.
pub(crate) fn resolve_config(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<ChrConfig, ExitCode> {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// chrtool - Convert between NES CHR tile data and PNG images
#[derive(Parser)]
#[command(name = "chrtool")]
#[command(about = "chrtool - Convert between NES CHR tile data (2bpp planar) and indexed PNG images")]
#[command(version)]
pub struct Cli {
    /// Path to a chrtool.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an indexed PNG (4 colours max) to CHR tile data
    Encode {
        /// Input indexed PNG, width and height multiples of 8
        input: PathBuf,

        /// Output CHR file or directory (default: <input stem>.chr)
        output: Option<PathBuf>,

        /// Validate the input only, do not write anything
        #[arg(long)]
        check: bool,

        /// Pad output with zeros to a multiple of this many bytes (e.g. 1024, 4096)
        #[arg(long)]
        pad: Option<u32>,
    },

    /// Convert CHR tile data to a PNG image
    Decode {
        /// Input CHR file
        input: PathBuf,

        /// Output PNG file or directory (default: <input stem>.png)
        output: Option<PathBuf>,

        /// Tiles per row (default: 16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        columns: Option<u32>,

        /// Display palette: grayscale, gameboy, 4 NES indices (0F,29,19,09) or 4 hex colours
        #[arg(long)]
        palette: Option<String>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Write an indexed PNG preserving the 2-bit tile values (scale 1 only)
        #[arg(long)]
        indexed: bool,

        /// Reject CHR data whose size is not a multiple of 16 instead of truncating
        #[arg(long)]
        strict: bool,
    },

    /// Show what an indexed PNG would encode to
    Info {
        /// Input PNG file
        input: PathBuf,
    },

    /// Validate CHR file sizes and bank alignment
    Validate {
        /// CHR files to validate
        files: Vec<PathBuf>,

        /// Also validate every .chr file under this directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Maximum number of banks allowed (0 = no limit)
        #[arg(long)]
        max_banks: Option<u32>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a tile text file to CHR tile data
    Compile {
        /// Input tile text file (rows of 0-3, '.' for 0, '#' comments)
        input: PathBuf,

        /// Output CHR file
        output: PathBuf,

        /// Pad output with zeros to a multiple of this many bytes
        #[arg(long)]
        pad: Option<u32>,
    },

    /// Copy tiles from one CHR file into another
    Merge {
        /// CHR file to copy tiles from
        source: PathBuf,

        /// CHR file to copy tiles into (updated in place unless -o is given)
        dest: PathBuf,

        /// Tile mapping SRC:DST, decimal or hex ($20, 0x20). Repeatable.
        #[arg(long = "map", value_name = "SRC:DST", required = true)]
        map: Vec<String>,

        /// Pad the destination to at least this many bytes before patching
        #[arg(long, default_value = "4096")]
        min_size: usize,

        /// Write the result here instead of overwriting the destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print CHR tiles as text
    Dump {
        /// Input CHR file
        input: PathBuf,

        /// Only print this tile (decimal or hex)
        #[arg(long)]
        tile: Option<String>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Encode { input, output, check, pad } => {
            convert::run_encode(&input, output.as_deref(), check, pad, config_path)
        }
        Commands::Decode { input, output, columns, palette, scale, indexed, strict } => {
            convert::run_decode(
                &input,
                output.as_deref(),
                columns,
                palette.as_deref(),
                scale,
                indexed,
                strict,
                config_path,
            )
        }
        Commands::Info { input } => info::run_info(&input),
        Commands::Validate { files, dir, max_banks, strict, json } => {
            validate::run_validate(&files, dir.as_deref(), max_banks, strict, json, config_path)
        }
        Commands::Compile { input, output, pad } => {
            convert::run_compile(&input, &output, pad, config_path)
        }
        Commands::Merge { source, dest, map, min_size, output } => {
            merge::run_merge(&source, &dest, &map, min_size, output.as_deref())
        }
        Commands::Dump { input, tile } => info::run_dump(&input, tile.as_deref()),
    }
}
