//! Resubmission driver
//!
//! Selects jobs in the requested status categories, clears their markers and
//! hands them back to the batch queue. Submission is fire-and-forget: the
//! driver spawns the submission command and moves on; whether the job really
//! reached the queue only shows up through marker files on a later run.
//! The spawn sits behind the `Submitter` trait so tests can record submitted
//! commands instead of talking to a real queue.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

use super::classifier::{DirReport, JobStatus, MARKER_SUFFIXES, marker_path};

/// Which status categories get resubmitted
///
/// `All` covers queued, failed and running jobs; completed jobs are never
/// resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResubmitMode {
    Queued,
    Failed,
    Running,
    All,
}

impl ResubmitMode {
    /// Whether jobs with the given status are selected in this mode
    pub fn selects(&self, status: JobStatus) -> bool {
        matches!(
            (self, status),
            (ResubmitMode::Queued, JobStatus::Queued)
                | (ResubmitMode::Failed, JobStatus::Failed)
                | (ResubmitMode::Running, JobStatus::Running)
                | (
                    ResubmitMode::All,
                    JobStatus::Queued | JobStatus::Failed | JobStatus::Running
                )
        )
    }
}

/// Abstraction over the queue submission command
pub trait Submitter {
    /// Submit one job script to the given queue
    fn submit(&self, script: &Path, queue: &str) -> AppResult<()>;
}

/// Spawns the configured batch submission command
///
/// The command is invoked as `{command} -q {queue} -o {script}.log {script}`
/// and its exit status is logged but not acted on.
#[derive(Debug, Clone)]
pub struct BatchSubmitter {
    command: String,
}

impl BatchSubmitter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Submitter for BatchSubmitter {
    fn submit(&self, script: &Path, queue: &str) -> AppResult<()> {
        let log = log_path(script);
        let status = Command::new(&self.command)
            .arg("-q")
            .arg(queue)
            .arg("-o")
            .arg(&log)
            .arg(script)
            .status()
            .map_err(|source| AppError::Submit {
                job: script.display().to_string(),
                source,
            })?;

        if status.success() {
            info!(script = %script.display(), queue, "resubmitted");
        } else {
            // Fire-and-forget: the queue's own output is the only record.
            warn!(script = %script.display(), %status, "submission command exited non-zero");
        }
        Ok(())
    }
}

/// Log file path derived from the job's path
fn log_path(script: &Path) -> PathBuf {
    marker_path(script, "log")
}

/// Select the scripts matching the mode across all directories
pub fn select_jobs<'a>(reports: &'a [DirReport], mode: ResubmitMode) -> Vec<&'a Path> {
    reports
        .iter()
        .flat_map(|report| report.iter())
        .filter(|(status, _)| mode.selects(*status))
        .map(|(_, script)| script)
        .collect()
}

/// Clear markers and resubmit every selected script
///
/// Scripts are made absolute before submission so the queue runs them
/// independently of the submitting shell's working directory. Returns the
/// number of jobs handed to the submitter.
pub fn resubmit_jobs(
    scripts: &[&Path],
    queue: &str,
    submitter: &dyn Submitter,
) -> AppResult<usize> {
    let mut submitted = 0;
    for script in scripts {
        let script = std::path::absolute(script).map_err(|source| AppError::Io {
            path: script.to_path_buf(),
            source,
        })?;
        clear_markers(&script)?;
        submitter.submit(&script, queue)?;
        submitted += 1;
    }
    Ok(submitted)
}

/// Remove any stale status markers for a script
///
/// Deleting a marker that does not exist is not an error, so the driver is
/// idempotent.
fn clear_markers(script: &Path) -> AppResult<()> {
    for (_, suffix) in MARKER_SUFFIXES {
        let marker = marker_path(script, suffix);
        match std::fs::remove_file(&marker) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(AppError::Io {
                path: marker,
                source,
            }),
        }
    }
    Ok(())
}
