//! CLI module for batchcheck
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution and validation
//! - Handlers for the check, resubmit and synchronize stages

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Environment};

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::logger::init_logger;

/// Load and merge configuration from CLI arguments
///
/// This function handles the complete configuration loading process:
/// 1. Load base configuration from files (or defaults)
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
pub fn load_and_merge_config(cli: &Cli) -> AppResult<Settings> {
    if let Some(env) = cli.env {
        // The loader reads the environment from this variable; the flag
        // simply takes its place.
        // SAFETY: called from main before any other thread exists.
        unsafe {
            std::env::set_var(
                crate::config::Environment::ENV_VAR,
                crate::config::Environment::from(env).as_str(),
            );
        }
    }

    let merger = ConfigurationMerger::from_config_path(cli.config.as_ref())?;
    let settings = merger.merge_cli_args(cli)?;
    Ok(settings)
}

/// Initialize logger from settings
///
/// # Errors
/// Returns error if logger initialization fails
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    init_logger(&settings.logger)
}
