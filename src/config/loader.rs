//! Configuration loading and discovery for `chrtool.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ChrConfig;
use log::{debug, info};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = "chrtool.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse chrtool.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override tiles per row
    pub columns: Option<u32>,
    /// Override scale factor
    pub scale: Option<u32>,
    /// Force indexed PNG output
    pub indexed: Option<bool>,
    /// Override display palette
    pub palette: Option<String>,
    /// Enable strict sheet handling
    pub strict: Option<bool>,
    /// Override bank limit for validation
    pub max_banks: Option<u32>,
    /// Override output padding
    pub pad_to: Option<u32>,
}

/// Find chrtool.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for chrtool.toml
/// 2. Check XDG_CONFIG_HOME/chrtool/chrtool.toml (or ~/.config/chrtool/chrtool.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find chrtool.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("chrtool").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find chrtool.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a chrtool.toml file.
///
/// If a path is provided, loads from that file (a missing file is an
/// error). Otherwise uses [`find_config`], falling back to defaults when no
/// file is found.
pub fn load_config(path: Option<&Path>) -> Result<ChrConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(default_config())
        }
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ChrConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ChrConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Configuration used when no chrtool.toml is found.
pub fn default_config() -> ChrConfig {
    ChrConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The result is
/// not re-validated here; callers check [`ChrConfig::validate`] afterwards.
pub fn merge_cli_overrides(config: &mut ChrConfig, overrides: &CliOverrides) {
    if let Some(columns) = overrides.columns {
        config.decode.columns = columns;
    }
    if let Some(scale) = overrides.scale {
        config.decode.scale = scale;
    }
    if let Some(indexed) = overrides.indexed {
        config.decode.indexed = indexed;
    }
    if let Some(ref palette) = overrides.palette {
        config.decode.palette = Some(palette.clone());
    }
    if let Some(strict) = overrides.strict {
        config.sheet.strict = strict;
    }
    if let Some(max_banks) = overrides.max_banks {
        config.banks.max_banks = max_banks;
    }
    if let Some(pad_to) = overrides.pad_to {
        config.banks.pad_to = pad_to;
    }
}
