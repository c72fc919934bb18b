//! Synchronize stage handler
//!
//! Mirrors result files from the job tree into the output tree.

use std::path::PathBuf;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::jobs::sync::{SyncOptions, SyncOutcome, synchronize};

/// Handler for the output synchronization stage
pub struct SyncCommandHandler {
    config: Settings,
}

impl SyncCommandHandler {
    /// Create a new sync handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Synchronize output for the discovered job directories
    pub fn execute(&self, job_dirs: &[PathBuf]) -> AppResult<SyncOutcome> {
        println!("Synching files");
        let outcome = synchronize(&self.config.scan.root, job_dirs, &self.options());
        if let Ok(ref outcome) = outcome {
            println!("Synched {} files", outcome.links_created);
        }
        outcome
    }

    fn options(&self) -> SyncOptions {
        let sync = &self.config.sync;
        SyncOptions {
            output_root: sync.output_root.clone(),
            source_root: sync.source_root.clone(),
            result_ext: sync.result_ext.clone(),
            backup_dir: sync.backup_dir.clone(),
            reserved_prefix: sync.reserved_prefix.clone(),
            trigger: sync.trigger,
            skip_backup: sync.skip_backup,
            clear_links: sync.clear_links,
        }
    }
}
