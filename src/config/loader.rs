//! Configuration loader for batchcheck
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::PathBuf;

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "BATCHCHECK_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "BATCHCHECK_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "BATCHCHECK";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of
/// priority):
/// 1. `default.toml` - Base default configuration (optional)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local overrides (optional)
/// 4. `BATCHCHECK_*` environment variables (highest priority)
///
/// Unlike a long-running service, this tool is routinely invoked with no
/// configuration files at all, so every file layer is optional and the
/// built-in defaults apply.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current application environment
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// This reads environment variables to determine:
    /// - Configuration directory (`BATCHCHECK_CONFIG_DIR`)
    /// - Specific configuration file (`BATCHCHECK_CONFIG_FILE`)
    /// - Application environment (`BATCHCHECK_APP_ENV`)
    ///
    /// # Errors
    ///
    /// Returns an error if both `BATCHCHECK_CONFIG_DIR` and
    /// `BATCHCHECK_CONFIG_FILE` are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::mutual_exclusivity(
                "BATCHCHECK_CONFIG_DIR and BATCHCHECK_CONFIG_FILE cannot both be set. \
                 Use BATCHCHECK_CONFIG_DIR for layered configuration or \
                 BATCHCHECK_CONFIG_FILE for a single configuration file.",
            ));
        }

        let environment = AppEnvironment::from_env();

        Ok(Self {
            config_dir,
            config_file,
            environment,
        })
    }

    /// Create a loader that reads a single specific configuration file
    ///
    /// Used for the `--config` command line flag; the file must exist.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Get the current application environment
    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load configuration from all sources
    ///
    /// If a specific configuration file is set, loads only that file.
    /// Otherwise, performs layered loading from the configuration directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicitly requested configuration file is missing
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {e}"))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build the config::Config instance from all sources
    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            // Single file mode; the file was asked for, so it must exist
            if !config_file.exists() {
                return Err(ConfigError::FileNotFound(
                    config_file.display().to_string(),
                ));
            }
            builder.add_source(File::from(config_file.as_path()).required(true))
        } else {
            self.add_layered_sources(builder)
        };

        // Environment variables are always the highest priority source:
        // BATCHCHECK_SCAN__ROOT -> scan.root
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR),
        );

        builder.build().map_err(ConfigError::from)
    }

    /// Add the layered file sources, lowest priority first
    fn add_layered_sources(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> ConfigBuilder<DefaultState> {
        let layers = [
            "default".to_string(),
            self.environment.as_str().to_string(),
            "local".to_string(),
        ];

        layers.iter().fold(builder, |builder, layer| {
            let path = self.layer_path(layer);
            builder.add_source(File::from(path.as_path()).required(false))
        })
    }

    fn layer_path(&self, layer: &str) -> PathBuf {
        self.config_dir.join(format!("{layer}.toml"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_with_file_loads_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batchcheck.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[scan]\nroot = \"mysub\"\n\n[batch]\nqueue = \"1nd\""
        )
        .unwrap();

        let loader = ConfigLoader::with_file(&path);
        let settings = loader.load().unwrap();
        assert_eq!(settings.scan.root, PathBuf::from("mysub"));
        assert_eq!(settings.batch.queue.as_deref(), Some("1nd"));
    }

    #[test]
    fn test_with_file_missing_is_an_error() {
        let loader = ConfigLoader::with_file("/nonexistent/batchcheck.toml");
        assert!(loader.load().is_err());
    }

    #[test]
    fn test_layered_sources_all_optional() {
        // No config directory at all still yields the built-in defaults.
        let loader = ConfigLoader {
            config_dir: PathBuf::from("/nonexistent/config"),
            config_file: None,
            environment: AppEnvironment::Development,
        };
        let settings = loader.load().unwrap();
        assert_eq!(settings.scan.root, PathBuf::from("sub"));
    }

    #[test]
    fn test_invalid_settings_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[scan]\nscript_ext = \".sh\"\n").unwrap();

        let loader = ConfigLoader::with_file(&path);
        assert!(loader.load().is_err());
    }
}
