//! Validate command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{find_chr_files, resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::CliOverrides;
use crate::validate::{validate_file_with_bank_size, ChrReport};

/// Outcome of validating one path
struct FileResult {
    path: PathBuf,
    report: Result<ChrReport, String>,
}

impl FileResult {
    fn passed(&self, strict: bool) -> bool {
        match &self.report {
            Ok(report) if strict => report.ok_strict(),
            Ok(report) => report.ok(),
            Err(_) => false,
        }
    }
}

fn format_line(result: &FileResult, strict: bool) -> String {
    let path = result.path.display();
    match &result.report {
        Err(message) => format!("FAIL: {} - {}", path, message),
        Ok(report) if !result.passed(strict) => {
            let reasons: Vec<&str> = if report.has_errors() {
                report.errors().map(|i| i.message.as_str()).collect()
            } else {
                report.warnings().map(|i| i.message.as_str()).collect()
            };
            format!("FAIL: {} - {}", path, reasons.join("; "))
        }
        Ok(report) => {
            let mut line = format!("OK: {} - {}", path, report.summary());
            let warnings: Vec<&str> = report.warnings().map(|i| i.message.as_str()).collect();
            if !warnings.is_empty() {
                line.push_str(&format!(" [WARN: {}]", warnings.join("; ")));
            }
            line
        }
    }
}

/// Execute the validate command
pub fn run_validate(
    files: &[PathBuf],
    dir: Option<&Path>,
    max_banks: Option<u32>,
    strict: bool,
    json: bool,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { max_banks, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mut paths: Vec<PathBuf> = files.to_vec();
    if let Some(dir) = dir {
        if !dir.is_dir() {
            eprintln!("Error: Not a directory: {}", dir.display());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        paths.extend(find_chr_files(dir));
    }

    if paths.is_empty() {
        eprintln!("Error: No files to validate");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let results: Vec<FileResult> = paths
        .into_iter()
        .map(|path| {
            let report = validate_file_with_bank_size(
                &path,
                config.banks.max_banks,
                config.banks.bank_size as usize,
            )
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => "file not found".to_string(),
                _ => e.to_string(),
            });
            FileResult { path, report }
        })
        .collect();

    let failed = results.iter().filter(|r| !r.passed(strict)).count();
    let has_warnings = results.iter().any(|r| r.report.as_ref().is_ok_and(ChrReport::has_warnings));

    if json {
        let entries: Vec<_> = results
            .iter()
            .map(|r| {
                let mut obj = serde_json::json!({
                    "path": r.path.display().to_string(),
                    "valid": r.passed(strict),
                });
                match &r.report {
                    Ok(report) => obj["report"] = serde_json::json!(report),
                    Err(message) => obj["error"] = serde_json::json!(message),
                }
                obj
            })
            .collect();

        let output = serde_json::json!({
            "valid": failed == 0,
            "files": entries,
        });

        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        for result in &results {
            println!("{}", format_line(result, strict));
        }

        println!();
        if failed == 0 {
            println!("All {} file(s) valid.", results.len());
        } else {
            println!("Found {} invalid file(s) out of {}", failed, results.len());
        }
        if has_warnings && !strict {
            println!("Hint: Run with --strict to treat warnings as errors");
        }
    }

    if failed > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_sheet;

    fn result(len: usize, max_banks: u32) -> FileResult {
        FileResult { path: PathBuf::from("bank.chr"), report: Ok(validate_sheet(len, max_banks)) }
    }

    #[test]
    fn test_ok_line() {
        assert_eq!(format_line(&result(1024, 0), false), "OK: bank.chr - 64 tiles, 1024 bytes (1.0 banks)");
    }

    #[test]
    fn test_ok_line_with_warning() {
        let line = format_line(&result(1040, 0), false);
        assert!(line.starts_with("OK: bank.chr - 65 tiles, 1040 bytes"));
        assert!(line.ends_with("[WARN: not aligned to 1024 byte bank boundary (1.02 banks)]"));
    }

    #[test]
    fn test_strict_turns_warning_into_failure() {
        let r = result(1040, 0);
        assert!(r.passed(false));
        assert!(!r.passed(true));
        assert!(format_line(&r, true).starts_with("FAIL: bank.chr - not aligned"));
    }

    #[test]
    fn test_fail_lines() {
        assert_eq!(
            format_line(&result(17, 0), false),
            "FAIL: bank.chr - 17 bytes, not a multiple of 16 (incomplete tile)"
        );
        assert_eq!(format_line(&result(2048, 1), false), "FAIL: bank.chr - 2.0 banks exceeds max 1");

        let missing =
            FileResult { path: PathBuf::from("gone.chr"), report: Err("file not found".to_string()) };
        assert!(!missing.passed(false));
        assert_eq!(format_line(&missing, false), "FAIL: gone.chr - file not found");
    }
}
