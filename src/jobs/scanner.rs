//! Job directory discovery
//!
//! Walks the submission tree and produces the ordered set of candidate job
//! directories, optionally filtered by a path regex and a minimum
//! modification time.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

/// Filters applied while discovering job directories
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Directory paths must match this pattern when set
    pub regex: Option<Regex>,
    /// Directories modified before this instant are skipped when set;
    /// a directory modified exactly at the threshold is kept
    pub min_mtime: Option<Timestamp>,
}

impl ScanFilter {
    fn accepts(&self, entry: &walkdir::DirEntry) -> bool {
        if let Some(ref regex) = self.regex
            && !regex.is_match(&entry.path().to_string_lossy())
        {
            return false;
        }

        if let Some(threshold) = self.min_mtime {
            let Some(mtime) = dir_mtime(entry) else {
                return false;
            };
            if mtime < threshold {
                return false;
            }
        }

        true
    }
}

fn dir_mtime(entry: &walkdir::DirEntry) -> Option<Timestamp> {
    let modified = entry.metadata().ok()?.modified().ok()?;
    Timestamp::try_from(modified).ok()
}

/// Discover candidate job directories under `root`
///
/// Every directory below the root (the root itself excluded) that passes the
/// filter is returned, in traversal order with first-seen de-duplication.
/// A non-existent root yields an empty list, not an error.
pub fn scan_job_dirs(root: &Path, filter: &ScanFilter) -> Vec<PathBuf> {
    let mut job_dirs: Vec<PathBuf> = Vec::new();

    if !root.is_dir() {
        debug!(root = %root.display(), "scan root missing or not a directory");
        return job_dirs;
    }

    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if !filter.accepts(&entry) {
            continue;
        }
        let path = entry.path();
        if !job_dirs.iter().any(|seen| seen == path) {
            job_dirs.push(path.to_path_buf());
        }
    }

    debug!(root = %root.display(), count = job_dirs.len(), "discovered job directories");
    job_dirs
}
