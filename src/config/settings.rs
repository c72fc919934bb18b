//! Configuration settings structures for batchcheck
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables. Every value here can also be
//! overridden from the command line, see `cli::config_merger`.

use std::path::PathBuf;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::validation;
use crate::jobs::resubmit::ResubmitMode;
use crate::jobs::sync::BackupTrigger;
use crate::logger::LoggerConfig;

// ============================================================================
// Default value functions
// ============================================================================

fn default_scan_root() -> PathBuf {
    PathBuf::from("sub")
}

fn default_script_ext() -> String {
    "sh".to_string()
}

fn default_submit_command() -> String {
    "qsub".to_string()
}

fn default_output_root() -> PathBuf {
    PathBuf::from("root")
}

fn default_result_ext() -> String {
    "root".to_string()
}

fn default_backup_dir() -> String {
    "back_up".to_string()
}

fn default_reserved_prefix() -> String {
    "scan".to_string()
}

// ============================================================================
// Scan Configuration
// ============================================================================

/// Where and how job directories are discovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root submission directory; every directory below it (but not the root
    /// itself) is a candidate job directory
    #[serde(default = "default_scan_root")]
    pub root: PathBuf,

    /// Optional directory path filter
    #[serde(default)]
    pub regex: Option<String>,

    /// Optional minimum modification date (ISO `yyyy-mm-dd` in config files,
    /// `dd/mm/yyyy` on the command line)
    #[serde(default)]
    pub date: Option<Date>,

    /// File extension (without the dot) that identifies a job script
    #[serde(default = "default_script_ext")]
    pub script_ext: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_scan_root(),
            regex: None,
            date: None,
            script_ext: default_script_ext(),
        }
    }
}

impl ScanConfig {
    /// Validate scan configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_extension("scan.script_ext", &self.script_ext)?;
        if let Some(ref pattern) = self.regex {
            validation::validate_pattern("scan.regex", pattern)?;
        }
        Ok(())
    }
}

// ============================================================================
// Batch Queue Configuration
// ============================================================================

/// How jobs are handed back to the batch system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Submission command, e.g. `qsub` or `bsub`
    #[serde(default = "default_submit_command")]
    pub submit_command: String,

    /// Target queue; when unset, resubmission is a dry-run preview
    #[serde(default)]
    pub queue: Option<String>,

    /// Which status category to resubmit; when unset, nothing is resubmitted
    #[serde(default)]
    pub mode: Option<ResubmitMode>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            submit_command: default_submit_command(),
            queue: None,
            mode: None,
        }
    }
}

impl BatchConfig {
    /// Validate batch configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.submit_command.trim().is_empty() {
            return Err(ConfigError::validation(
                "batch.submit_command",
                "submission command cannot be empty",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Output Synchronization Configuration
// ============================================================================

/// How result files are mirrored into the output tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Whether synchronization runs at all
    #[serde(default)]
    pub enabled: bool,

    /// Output tree the result files are linked into
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Alternate source directory; job directories are rebased onto it
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// File extension (without the dot) that identifies a result file
    #[serde(default = "default_result_ext")]
    pub result_ext: String,

    /// Name of the backup directory inside the output root
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Entries in the output root starting with this prefix are moved aside
    /// when a backup runs
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,

    /// Rule deciding whether existing output triggers a backup
    #[serde(default)]
    pub trigger: BackupTrigger,

    /// Suppress the backup even when the trigger fires
    #[serde(default)]
    pub skip_backup: bool,

    /// Remove pre-existing entries at link targets before relinking
    #[serde(default)]
    pub clear_links: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_root: default_output_root(),
            source_root: None,
            result_ext: default_result_ext(),
            backup_dir: default_backup_dir(),
            reserved_prefix: default_reserved_prefix(),
            trigger: BackupTrigger::default(),
            skip_backup: false,
            clear_links: false,
        }
    }
}

impl SyncConfig {
    /// Validate synchronization configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_extension("sync.result_ext", &self.result_ext)?;
        if self.backup_dir.trim().is_empty() {
            return Err(ConfigError::validation(
                "sync.backup_dir",
                "backup directory name cannot be empty",
            ));
        }
        if self.reserved_prefix.trim().is_empty() {
            return Err(ConfigError::validation(
                "sync.reserved_prefix",
                "reserved prefix cannot be empty",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Top-level Settings
// ============================================================================

/// Merged application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logger: LoggerConfig,
}

impl Settings {
    /// Validate the complete configuration
    ///
    /// Violations here are fatal and reported before any scanning starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.batch.validate()?;
        self.sync.validate()?;
        self.logger.validate().map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: format!("{e:#}"),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.scan.root, PathBuf::from("sub"));
        assert_eq!(settings.scan.script_ext, "sh");
        assert_eq!(settings.batch.submit_command, "qsub");
        assert_eq!(settings.sync.output_root, PathBuf::from("root"));
        assert_eq!(settings.sync.result_ext, "root");
        assert_eq!(settings.sync.backup_dir, "back_up");
        assert_eq!(settings.sync.reserved_prefix, "scan");
        assert!(!settings.sync.enabled);
    }

    #[test]
    fn test_dotted_extension_rejected() {
        let mut settings = Settings::default();
        settings.scan.script_ext = ".sh".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sync.result_ext = ".root".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_submit_command_rejected() {
        let mut settings = Settings::default();
        settings.batch.submit_command = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_regex_rejected() {
        let mut settings = Settings::default();
        settings.scan.regex = Some("(unclosed".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [scan]
            root = "jobs/sub"
            regex = "toy_.*"
            date = "2026-01-15"
            script_ext = "sh"

            [batch]
            submit_command = "bsub"
            queue = "8nh"
            mode = "failed"

            [sync]
            enabled = true
            output_root = "jobs/root"
            clear_links = true
            trigger = "job-dirs"
            "#,
        )
        .unwrap();

        assert_eq!(settings.scan.root, PathBuf::from("jobs/sub"));
        assert_eq!(settings.scan.regex.as_deref(), Some("toy_.*"));
        assert_eq!(
            settings.scan.date,
            Some(jiff::civil::date(2026, 1, 15))
        );
        assert_eq!(settings.batch.submit_command, "bsub");
        assert_eq!(settings.batch.queue.as_deref(), Some("8nh"));
        assert_eq!(settings.batch.mode, Some(ResubmitMode::Failed));
        assert!(settings.sync.enabled);
        assert!(settings.sync.clear_links);
        assert_eq!(settings.sync.trigger, BackupTrigger::JobDirs);
        assert!(settings.validate().is_ok());
    }
}
