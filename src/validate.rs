//! Validation of CHR files
//!
//! Checks the structural properties a CHR file needs before it can be
//! linked into a ROM: a whole number of tiles, alignment to 1 KiB banks,
//! and an optional bank budget. Only the file length is inspected.

use serde::Serialize;
use std::io;
use std::path::Path;

use crate::bank::BANK_SIZE;
use crate::tile::PACKED_TILE_BYTES;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Type of validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// File has no bytes
    EmptyFile,
    /// Length is not a multiple of 16
    IncompleteTile,
    /// More banks than the configured limit
    TooManyBanks,
    /// Length is not a multiple of 1024
    BankMisaligned,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueType::EmptyFile => write!(f, "empty_file"),
            IssueType::IncompleteTile => write!(f, "incomplete_tile"),
            IssueType::TooManyBanks => write!(f, "too_many_banks"),
            IssueType::BankMisaligned => write!(f, "bank_misaligned"),
        }
    }
}

/// A validation issue found in a CHR file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Human-readable message describing the issue
    pub message: String,
}

impl ValidationIssue {
    /// Create a new error
    pub fn error(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, issue_type, message: message.into() }
    }

    /// Create a new warning
    pub fn warning(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, issue_type, message: message.into() }
    }
}

/// Validation result for one CHR file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChrReport {
    pub bytes: usize,
    /// Complete tiles (`bytes / 16`)
    pub tiles: usize,
    pub multiple_of_16: bool,
    pub multiple_of_bank: bool,
    /// Size in 1 KiB banks, fractional for partial banks
    pub banks: f64,
    /// Only ever set when a bank limit was given
    pub exceeds_max_banks: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ChrReport {
    /// True when there are no errors. Warnings do not affect this.
    pub fn ok(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// Passes under strict mode, where warnings also fail.
    pub fn ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// One-line size summary, e.g. `64 tiles, 1024 bytes (1.0 banks)`.
    pub fn summary(&self) -> String {
        format!("{} tiles, {} bytes ({:.1} banks)", self.tiles, self.bytes, self.banks)
    }
}

/// Validate a CHR sheet of `len` bytes against 1 KiB banks.
/// A `max_banks` of 0 means no limit.
pub fn validate_sheet(len: usize, max_banks: u32) -> ChrReport {
    validate_sheet_with_bank_size(len, max_banks, BANK_SIZE)
}

/// Validate a CHR sheet of `len` bytes against banks of `bank_size` bytes.
///
/// `bank_size` must be non-zero; [`crate::config::ChrConfig::validate`]
/// rejects a zero bank size before it reaches here.
pub fn validate_sheet_with_bank_size(len: usize, max_banks: u32, bank_size: usize) -> ChrReport {
    let bank_size = bank_size.max(1);
    let banks = len as f64 / bank_size as f64;
    let multiple_of_16 = len % PACKED_TILE_BYTES == 0;
    let multiple_of_bank = len % bank_size == 0;
    let exceeds_max_banks = max_banks > 0 && banks > max_banks as f64;

    let mut issues = Vec::new();
    if len == 0 {
        issues.push(ValidationIssue::error(IssueType::EmptyFile, "empty file"));
    } else {
        if !multiple_of_16 {
            issues.push(ValidationIssue::error(
                IssueType::IncompleteTile,
                format!("{} bytes, not a multiple of 16 (incomplete tile)", len),
            ));
        }
        if exceeds_max_banks {
            issues.push(ValidationIssue::error(
                IssueType::TooManyBanks,
                format!("{:.1} banks exceeds max {}", banks, max_banks),
            ));
        }
        if !multiple_of_bank {
            issues.push(ValidationIssue::warning(
                IssueType::BankMisaligned,
                format!("not aligned to {} byte bank boundary ({:.2} banks)", bank_size, banks),
            ));
        }
    }

    ChrReport {
        bytes: len,
        tiles: len / PACKED_TILE_BYTES,
        multiple_of_16,
        multiple_of_bank,
        banks,
        exceeds_max_banks,
        issues,
    }
}

/// Validate a CHR file on disk from its size alone.
pub fn validate_file(path: &Path, max_banks: u32) -> io::Result<ChrReport> {
    validate_file_with_bank_size(path, max_banks, BANK_SIZE)
}

/// [`validate_file`] with a custom bank size.
pub fn validate_file_with_bank_size(
    path: &Path,
    max_banks: u32,
    bank_size: usize,
) -> io::Result<ChrReport> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    Ok(validate_sheet_with_bank_size(metadata.len() as usize, max_banks, bank_size))
}
