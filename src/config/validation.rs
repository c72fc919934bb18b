//! Configuration validation helpers
//!
//! Small checks shared by the settings structures. All of them run before
//! any scanning starts, so a bad value aborts the whole run up front.

use regex::Regex;

use crate::config::error::ConfigError;

/// Validate a file extension setting
///
/// Extensions are stored without the leading dot; an empty value would match
/// every file.
pub fn validate_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.trim().is_empty() {
        return Err(ConfigError::validation(field, "extension cannot be empty"));
    }
    if ext.starts_with('.') {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!("extension must be given without the leading dot, got '{ext}'"),
        });
    }
    Ok(())
}

/// Validate that a directory filter pattern compiles
pub fn validate_pattern(field: &str, pattern: &str) -> Result<(), ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::ValidationError {
        field: field.to_string(),
        message: format!("invalid regular expression '{pattern}': {e}"),
    })?;
    Ok(())
}
