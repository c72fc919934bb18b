//! Configuration types for the logger

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::logger::error::LoggerError;

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/batchcheck.log")
}

/// Main logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Log level string: trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub file: FileConfig,
}

impl LoggerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parse_level()
            .with_context(|| format!("Invalid log level: {}", self.level))?;

        self.file.validate().context("Invalid file configuration")?;

        // Ensure at least one output is enabled
        if !self.console.enabled && !self.file.enabled {
            anyhow::bail!("At least one output (console or file) must be enabled");
        }

        Ok(())
    }

    /// Parse the log level string into a tracing::Level
    pub fn parse_level(&self) -> Result<Level, LoggerError> {
        match self.level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => Err(LoggerError::InvalidLevel(self.level.clone())),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

/// Console output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// File output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    #[serde(default = "default_true")]
    pub append: bool,

    #[serde(default)]
    pub format: LogFormat,
}

impl FileConfig {
    /// Validate file configuration
    ///
    /// Pure validation; the log file itself is created at init time.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.path.as_os_str().is_empty() {
            anyhow::bail!("File path cannot be empty when file output is enabled");
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: LogFormat::default(),
        }
    }
}

/// Log line format for file output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default human-readable format
    #[default]
    Full,
    /// Compact single-line format
    Compact,
    /// Newline-delimited JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoggerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level, "info");
        assert!(config.console.enabled);
        assert!(!config.file.enabled);
    }

    #[test]
    fn test_parse_level() {
        let mut config = LoggerConfig::default();
        for (s, level) in [
            ("trace", Level::TRACE),
            ("debug", Level::DEBUG),
            ("info", Level::INFO),
            ("warn", Level::WARN),
            ("error", Level::ERROR),
        ] {
            config.level = s.to_string();
            assert_eq!(config.parse_level().unwrap(), level);
        }
    }

    #[test]
    fn test_invalid_level_rejected() {
        let mut config = LoggerConfig::default();
        config.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_output_rejected() {
        let mut config = LoggerConfig::default();
        config.console.enabled = false;
        config.file.enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_file_requires_path() {
        let mut config = LoggerConfig::default();
        config.file.enabled = true;
        config.file.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_from_toml() {
        let config: FileConfig =
            toml::from_str("enabled = true\npath = \"x.log\"\nformat = \"json\"").unwrap();
        assert_eq!(config.format, LogFormat::Json);
    }
}
