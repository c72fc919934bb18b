//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based
//! configuration, implementing the configuration precedence logic.

use std::path::PathBuf;

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Configuration merger that handles CLI argument integration with
/// file-based configuration
///
/// CLI arguments override configuration file values, which in turn override
/// the built-in defaults.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Create a configuration merger by loading configuration from the
    /// specified path or the default layered loader
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_config_path(config_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) => ConfigLoader::with_file(path).load()?,
            None => ConfigLoader::new()?.load()?,
        };

        Ok(Self::new(config))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// # Returns
    /// A new Settings instance with CLI overrides applied and validated
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        self.apply_logging_overrides(&mut config, cli);
        self.apply_scan_overrides(&mut config, cli);
        self.apply_batch_overrides(&mut config, cli);
        self.apply_sync_overrides(&mut config, cli);

        config.validate()?;

        Ok(config)
    }

    fn apply_logging_overrides(&self, config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_scan_overrides(&self, config: &mut Settings, cli: &Cli) {
        if let Some(ref dir) = cli.dir {
            config.scan.root = dir.clone();
        }
        if let Some(ref regex) = cli.regex {
            config.scan.regex = Some(regex.as_str().to_string());
        }
        if let Some(date) = cli.date {
            config.scan.date = Some(date);
        }
    }

    fn apply_batch_overrides(&self, config: &mut Settings, cli: &Cli) {
        if let Some(mode) = cli.resubmit {
            config.batch.mode = Some(mode);
        }
        if let Some(ref queue) = cli.queue {
            config.batch.queue = Some(queue.clone());
        }
    }

    fn apply_sync_overrides(&self, config: &mut Settings, cli: &Cli) {
        if cli.synch {
            config.sync.enabled = true;
        }
        if let Some(ref synchdir) = cli.synchdir {
            config.sync.source_root = Some(synchdir.clone());
        }
        if cli.skip_backup {
            config.sync.skip_backup = true;
        }
        if cli.clear_links {
            config.sync.clear_links = true;
        }
    }

    /// Get the current configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
