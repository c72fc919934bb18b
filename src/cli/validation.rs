//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use jiff::civil::Date;
use regex::Regex;

/// Validate that a directory filter compiles as a regular expression
pub fn validate_regex(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("Invalid regular expression '{pattern}': {e}"))
}

/// Validate and parse a dd/mm/yyyy date
pub fn validate_date(date_str: &str) -> Result<Date, String> {
    Date::strptime("%d/%m/%Y", date_str).map_err(|e| {
        format!("Date must be given as dd/mm/yyyy (e.g. 01/06/2026), got '{date_str}': {e}")
    })
}

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{path_str}': {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_validation_valid() {
        for pattern in ["toy_[0-9]+", ".*", "jobA|jobB"] {
            assert!(validate_regex(pattern).is_ok(), "pattern {pattern}");
        }
    }

    #[test]
    fn test_regex_validation_invalid() {
        for pattern in ["(unclosed", "[z-a]", "*leading"] {
            assert!(validate_regex(pattern).is_err(), "pattern {pattern}");
        }
    }

    #[test]
    fn test_date_validation_valid() {
        assert_eq!(
            validate_date("01/06/2026").unwrap(),
            jiff::civil::date(2026, 6, 1)
        );
        assert_eq!(
            validate_date("31/12/1999").unwrap(),
            jiff::civil::date(1999, 12, 31)
        );
    }

    #[test]
    fn test_date_validation_invalid() {
        for date in ["2026-06-01", "31/02/2026", "1/13/2026", "yesterday", ""] {
            assert!(validate_date(date).is_err(), "date '{date}'");
        }
    }

    #[test]
    fn test_config_file_path_missing() {
        assert!(validate_config_file_path("/nonexistent/batchcheck.toml").is_err());
    }

    #[test]
    fn test_config_file_path_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_config_file_path_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(
            validate_config_file_path(path.to_str().unwrap()).unwrap(),
            path
        );
    }
}
