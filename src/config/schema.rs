//! Configuration schema types for `chrtool.toml`
//!
//! Defines the structure and validation rules for chrtool configuration.

use serde::{Deserialize, Serialize};

use crate::palette::DisplayPalette;
use crate::tile::PACKED_TILE_BYTES;

/// Settings for CHR to PNG decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Tiles per row in the decoded image
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Integer upscale factor for RGB output
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Write an indexed PNG instead of RGB
    #[serde(default)]
    pub indexed: bool,
    /// Display palette: built-in name, 4 NES indices, or 4 hex colours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { columns: default_columns(), scale: default_scale(), indexed: false, palette: None }
    }
}

fn default_columns() -> u32 {
    16
}

fn default_scale() -> u32 {
    1
}

/// Sheet handling settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Reject CHR data with a trailing partial tile instead of truncating
    #[serde(default)]
    pub strict: bool,
}

/// Bank sizing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanksConfig {
    /// Bank size used for alignment, in bytes
    #[serde(default = "default_bank_size")]
    pub bank_size: u32,
    /// Maximum number of banks for `validate` (0 = unlimited)
    #[serde(default)]
    pub max_banks: u32,
    /// Pad encoded output to a multiple of this many bytes (0 = no padding)
    #[serde(default)]
    pub pad_to: u32,
}

impl Default for BanksConfig {
    fn default() -> Self {
        Self { bank_size: default_bank_size(), max_banks: 0, pad_to: 0 }
    }
}

fn default_bank_size() -> u32 {
    1024
}

/// Complete chrtool.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChrConfig {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub banks: BanksConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "decode.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chrtool.toml: '{}' {}", self.field, self.message)
    }
}

impl ChrConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.decode.columns == 0 {
            errors.push(ConfigValidationError {
                field: "decode.columns".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.decode.scale == 0 || self.decode.scale > 16 {
            errors.push(ConfigValidationError {
                field: "decode.scale".to_string(),
                message: "must be between 1 and 16".to_string(),
            });
        }

        if let Some(ref palette) = self.decode.palette {
            if let Err(e) = palette.parse::<DisplayPalette>() {
                errors.push(ConfigValidationError {
                    field: "decode.palette".to_string(),
                    message: e.to_string(),
                });
            }
        }

        if self.banks.bank_size == 0 || self.banks.bank_size as usize % PACKED_TILE_BYTES != 0 {
            errors.push(ConfigValidationError {
                field: "banks.bank_size".to_string(),
                message: "must be a positive multiple of 16".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// The configured display palette, or grayscale when none is set.
    pub fn display_palette(&self) -> DisplayPalette {
        self.decode
            .palette
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }
}
