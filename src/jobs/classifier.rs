//! Marker-file status classification
//!
//! A job script's status is a pure function of which marker files sit next
//! to it at scan time: `<script>.done`, `<script>.fail` or `<script>.run`.
//! No marker means the job is still queued. Classification never mutates
//! the tree.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

/// Marker suffixes in priority order; the first existing marker wins
pub const MARKER_SUFFIXES: [(JobStatus, &str); 3] = [
    (JobStatus::Done, "done"),
    (JobStatus::Failed, "fail"),
    (JobStatus::Running, "run"),
];

/// Job status derived from marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// `<script>.done` exists
    Done,
    /// `<script>.fail` exists
    Failed,
    /// `<script>.run` exists
    Running,
    /// No marker exists
    Queued,
}

impl JobStatus {
    /// Human-readable label used in the status report
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Done => "Complete",
            JobStatus::Failed => "Failed",
            JobStatus::Running => "Running",
            JobStatus::Queued => "Queued",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification result for one job directory
///
/// The four lists partition the discovered job scripts: every script lands
/// in exactly one of them.
#[derive(Debug, Clone, Serialize)]
pub struct DirReport {
    /// The classified job directory
    pub dir: PathBuf,
    pub done: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub running: Vec<PathBuf>,
    pub queued: Vec<PathBuf>,
}

impl DirReport {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            done: Vec::new(),
            failed: Vec::new(),
            running: Vec::new(),
            queued: Vec::new(),
        }
    }

    /// Number of job scripts found in this directory
    pub fn total(&self) -> usize {
        self.done.len() + self.failed.len() + self.running.len() + self.queued.len()
    }

    /// Scripts in the given status category
    pub fn scripts(&self, status: JobStatus) -> &[PathBuf] {
        match status {
            JobStatus::Done => &self.done,
            JobStatus::Failed => &self.failed,
            JobStatus::Running => &self.running,
            JobStatus::Queued => &self.queued,
        }
    }

    /// Iterate over every script together with its status
    pub fn iter(&self) -> impl Iterator<Item = (JobStatus, &Path)> {
        [
            JobStatus::Done,
            JobStatus::Failed,
            JobStatus::Running,
            JobStatus::Queued,
        ]
        .into_iter()
        .flat_map(|status| {
            self.scripts(status)
                .iter()
                .map(move |script| (status, script.as_path()))
        })
    }

    fn push(&mut self, status: JobStatus, script: PathBuf) {
        match status {
            JobStatus::Done => self.done.push(script),
            JobStatus::Failed => self.failed.push(script),
            JobStatus::Running => self.running.push(script),
            JobStatus::Queued => self.queued.push(script),
        }
    }
}

/// Path of the marker file for a script and suffix
pub fn marker_path(script: &Path, suffix: &str) -> PathBuf {
    let mut name = script.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Classify one script by probing its markers in priority order
fn classify_script(script: &Path) -> JobStatus {
    for (status, suffix) in MARKER_SUFFIXES {
        if marker_path(script, suffix).exists() {
            return status;
        }
    }
    JobStatus::Queued
}

/// Classify every job script directly inside `dir`
///
/// Only the directory's own files are considered; nested directories are job
/// directories in their own right and get their own report. Scripts are
/// recognized by `script_ext` (without the dot). A missing directory yields
/// an empty report.
pub fn classify_dir(dir: &Path, script_ext: &str) -> DirReport {
    let mut report = DirReport::new(dir);

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(OsStr::to_str) != Some(script_ext) {
            continue;
        }
        report.push(classify_script(path), path.to_path_buf());
    }

    report
}
