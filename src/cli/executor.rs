//! Command executor for the linear run
//!
//! This module provides the main entry point for executing a run after
//! parsing and configuration loading: scan/classify/report, then the
//! optional resubmission and synchronization stages.

use super::handlers::{CheckCommandHandler, ResubmitCommandHandler, SyncCommandHandler};
use super::parser::Cli;
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute one run with the given settings
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
///
/// # Errors
/// Returns errors from argument validation or from the individual stages
pub fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    validate_command_args(cli)?;

    let check = CheckCommandHandler::new(settings.clone());
    let (dirs, reports) = check.execute(cli.json)?;

    if settings.batch.mode.is_some() {
        ResubmitCommandHandler::new(settings.clone()).execute(&reports)?;
    }

    if settings.sync.enabled {
        SyncCommandHandler::new(settings).execute(&dirs)?;
    }

    Ok(())
}

/// Validate flag combinations before any stage runs
fn validate_command_args(cli: &Cli) -> AppResult<()> {
    if let Err(msg) = cli.validate() {
        return Err(crate::error::AppError::Validation {
            field: "cli_arguments".to_string(),
            reason: msg,
        });
    }
    Ok(())
}
