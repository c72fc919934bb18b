//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all flags, their validation and their documentation.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use jiff::civil::Date;
use regex::Regex;

use crate::jobs::resubmit::ResubmitMode;

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// Batch farm job checker
///
/// One invocation runs a strictly linear pass: scan the submission tree,
/// classify every job script by its marker files, print the status report,
/// then optionally resubmit selected jobs and mirror result files into the
/// output tree.
#[derive(Parser, Debug)]
#[command(name = "batchcheck")]
#[command(about = "Check, resubmit and synchronize batch farm jobs")]
#[command(long_about = "
Batchcheck polls a batch submission tree for job status. Each job script is
classified by the marker file sitting next to it (<script>.done, .fail or
.run; no marker means queued), counts are reported per directory and in
total, and jobs can be handed back to the batch queue or their results
mirrored into an output tree as symbolic links.

EXAMPLES:
    # Report status of everything under ./sub
    batchcheck

    # Check a different tree, only toy directories touched since June 1st
    batchcheck --dir jobs/sub --regex 'toy_.*' --date 01/06/2026

    # Preview which failed jobs would be resubmitted
    batchcheck --resubmit failed

    # Actually resubmit them to the 8nh queue
    batchcheck --resubmit failed -q 8nh

    # Mirror result files into the output tree, refreshing stale links
    batchcheck --synch --clear-links

For more information about configuration options, see the documentation.
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Root submission directory to scan
    ///
    /// Every directory below this one (but not the root itself) is a
    /// candidate job directory. Defaults to the configured scan root,
    /// conventionally `sub`.
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Only consider job directories whose path matches this pattern
    ///
    /// The pattern is validated as a regular expression at parse time.
    ///
    /// Example: --regex 'toy_[0-9]+'
    #[arg(long, value_name = "PATTERN", value_parser = super::validation::validate_regex)]
    pub regex: Option<Regex>,

    /// Only consider job directories modified on or after this date
    ///
    /// The date is given as dd/mm/yyyy and compared against the directory's
    /// last-modified time at local midnight.
    ///
    /// Example: --date 01/06/2026
    #[arg(long, value_name = "DATE", value_parser = super::validation::validate_date)]
    pub date: Option<Date>,

    /// Resubmit jobs in the given status category
    ///
    /// `all` covers queued, failed and running jobs; completed jobs are
    /// never resubmitted. Without --queue this is a dry-run preview that
    /// only prints the selected job names.
    #[arg(long, value_enum, ignore_case = true, value_name = "MODE")]
    pub resubmit: Option<ResubmitMode>,

    /// Batch queue to submit to
    ///
    /// When omitted, --resubmit previews the selection without touching
    /// markers or the queue.
    #[arg(short, long, value_name = "QUEUE")]
    pub queue: Option<String>,

    /// Mirror result files into the output tree as symbolic links
    #[arg(short, long)]
    pub synch: bool,

    /// Alternate source directory for synchronization
    ///
    /// Job directories are rebased onto this tree when reading result
    /// files; useful when the data lives on a different mount than the
    /// submission scripts.
    #[arg(long, value_name = "DIR")]
    pub synchdir: Option<PathBuf>,

    /// Skip the backup of existing output before synchronizing
    #[arg(long, alias = "skipBackUp")]
    pub skip_backup: bool,

    /// Remove stale links before relinking
    ///
    /// Makes repeated synchronization runs idempotent instead of skipping
    /// targets that already exist.
    #[arg(long, alias = "clearLinks")]
    pub clear_links: bool,

    /// Print the summary as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Configuration file path
    ///
    /// Specify a custom configuration file to use instead of the layered
    /// configuration directory. The file should be in TOML format and must
    /// exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Force a specific environment configuration layer. Available values:
    /// development (dev), production (prod), test
    #[arg(long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with
    /// --verbose.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

impl Cli {
    /// Validate CLI arguments and provide detailed error messages
    ///
    /// This method performs additional validation beyond what clap provides,
    /// ensuring that all flag combinations are valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue.is_some() && self.resubmit.is_none() {
            return Err("--queue has no effect without --resubmit".to_string());
        }

        if !self.synch {
            if self.synchdir.is_some() {
                return Err("--synchdir has no effect without --synch".to_string());
            }
            if self.skip_backup {
                return Err("--skip-backup has no effect without --synch".to_string());
            }
            if self.clear_links {
                return Err("--clear-links has no effect without --synch".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
