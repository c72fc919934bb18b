//! Output synchronization
//!
//! Mirrors result files from the job tree into the output tree as symbolic
//! links, optionally moving previous output into a timestamped backup first.
//! Missing sources are skipped, never raised; a failed link is logged and
//! skipped so one bad entry cannot abort the pass.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{AppError, AppResult};

/// Rule deciding whether existing output must be moved aside first
///
/// The two revisions of the original tool disagreed on this, so it is a
/// configurable predicate rather than a guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupTrigger {
    /// Backup when the output root holds a subdirectory whose name starts
    /// with the reserved prefix
    #[default]
    Prefix,
    /// Backup when the output root holds a subdirectory named like one of
    /// the discovered job directories
    JobDirs,
}

/// Inputs for one synchronization pass
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Output tree the result files are linked into
    pub output_root: PathBuf,
    /// Alternate source tree; job directories are rebased onto it
    pub source_root: Option<PathBuf>,
    /// File extension (without the dot) that identifies a result file
    pub result_ext: String,
    /// Name of the backup directory inside the output root
    pub backup_dir: String,
    /// Entries starting with this prefix are moved aside by a backup
    pub reserved_prefix: String,
    /// Rule deciding whether a backup is needed
    pub trigger: BackupTrigger,
    /// Suppress the backup even when the trigger fires
    pub skip_backup: bool,
    /// Remove pre-existing entries at link targets before relinking
    pub clear_links: bool,
}

/// What a synchronization pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Number of links created in this pass
    pub links_created: usize,
    /// Whether previous output was moved into a backup
    pub backed_up: bool,
}

/// Mirror result files from every job directory into the output tree
///
/// Each job directory's path relative to `scan_root` is reproduced under the
/// output root and its result files are linked there by absolute source
/// path. Nested job directories handle their own direct files, so every
/// result file is linked exactly once.
pub fn synchronize(
    scan_root: &Path,
    job_dirs: &[PathBuf],
    opts: &SyncOptions,
) -> AppResult<SyncOutcome> {
    let mut outcome = SyncOutcome::default();

    if backup_needed(job_dirs, opts) {
        if opts.skip_backup {
            debug!("backup triggered but skipped on request");
        } else {
            backup_existing(opts)?;
            outcome.backed_up = true;
        }
    }

    for job_dir in job_dirs {
        let Ok(rel) = job_dir.strip_prefix(scan_root) else {
            warn!(dir = %job_dir.display(), "job directory outside the scan root, skipping");
            continue;
        };

        let source_dir = match opts.source_root {
            Some(ref base) => base.join(rel),
            None => job_dir.clone(),
        };
        let target_dir = opts.output_root.join(rel);

        fs::create_dir_all(&target_dir).map_err(|source| AppError::Io {
            path: target_dir.clone(),
            source,
        })?;

        outcome.links_created += link_results(&source_dir, &target_dir, opts)?;
    }

    info!(links = outcome.links_created, backed_up = outcome.backed_up, "synchronized");
    Ok(outcome)
}

/// Link this directory's own result files into the target directory
fn link_results(source_dir: &Path, target_dir: &Path, opts: &SyncOptions) -> AppResult<usize> {
    let mut created = 0;

    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(OsStr::to_str) != Some(opts.result_ext.as_str()) {
            continue;
        }

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = target_dir.join(file_name);
        let original = std::path::absolute(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if opts.clear_links {
            match fs::remove_file(&target) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(AppError::Io {
                        path: target,
                        source,
                    });
                }
            }
        }

        match symlink(&original, &target) {
            Ok(()) => created += 1,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(target = %target.display(), "link already present");
            }
            Err(e) => {
                warn!(target = %target.display(), error = %e, "failed to create link");
            }
        }
    }

    Ok(created)
}

/// Whether the configured trigger fires for the current output root
fn backup_needed(job_dirs: &[PathBuf], opts: &SyncOptions) -> bool {
    let Ok(entries) = fs::read_dir(&opts.output_root) else {
        return false;
    };

    let job_names: HashSet<&OsStr> = match opts.trigger {
        BackupTrigger::Prefix => HashSet::new(),
        BackupTrigger::JobDirs => job_dirs.iter().filter_map(|d| d.file_name()).collect(),
    };

    for entry in entries.filter_map(Result::ok) {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let fires = match opts.trigger {
            BackupTrigger::Prefix => name
                .to_string_lossy()
                .starts_with(opts.reserved_prefix.as_str()),
            BackupTrigger::JobDirs => job_names.contains(name.as_os_str()),
        };
        if fires {
            return true;
        }
    }

    false
}

/// Move previous output into `{output_root}/{backup_dir}/{unix_seconds}/`
///
/// Only entries whose name starts with the reserved prefix are moved.
/// Two backups within the same second collide; the original tool had the
/// same blind spot and in practice backups are minutes apart.
fn backup_existing(opts: &SyncOptions) -> AppResult<()> {
    let stamp = Timestamp::now().as_second();
    let backup_path = opts
        .output_root
        .join(&opts.backup_dir)
        .join(stamp.to_string());

    fs::create_dir_all(&backup_path).map_err(|source| AppError::Io {
        path: backup_path.clone(),
        source,
    })?;

    let entries = match fs::read_dir(&opts.output_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(AppError::Io {
                path: opts.output_root.clone(),
                source,
            });
        }
    };

    let mut moved = 0;
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        if name.to_string_lossy() == opts.backup_dir {
            continue;
        }
        if !name
            .to_string_lossy()
            .starts_with(opts.reserved_prefix.as_str())
        {
            continue;
        }
        let target = backup_path.join(&name);
        fs::rename(entry.path(), &target).map_err(|source| AppError::Io {
            path: entry.path(),
            source,
        })?;
        moved += 1;
    }

    info!(moved, backup = %backup_path.display(), "backed up previous output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(output_root: &Path) -> SyncOptions {
        SyncOptions {
            output_root: output_root.to_path_buf(),
            source_root: None,
            result_ext: "root".to_string(),
            backup_dir: "back_up".to_string(),
            reserved_prefix: "scan".to_string(),
            trigger: BackupTrigger::Prefix,
            skip_backup: false,
            clear_links: false,
        }
    }

    fn build_job_tree(scan_root: &Path) -> Vec<PathBuf> {
        let job = scan_root.join("scan_job");
        fs::create_dir_all(&job).unwrap();
        fs::write(job.join("result.root"), "data").unwrap();
        fs::write(job.join("run.sh"), "").unwrap();
        vec![job]
    }

    #[test]
    fn test_links_mirror_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        let outcome = synchronize(&scan_root, &job_dirs, &options(&output_root)).unwrap();
        assert_eq!(outcome.links_created, 1);

        let link = output_root.join("scan_job/result.root");
        let meta = fs::symlink_metadata(&link).unwrap();
        assert!(meta.file_type().is_symlink());

        let dest = fs::read_link(&link).unwrap();
        assert!(dest.is_absolute());
        assert!(dest.ends_with("sub/scan_job/result.root"));
        // links resolve to the real data
        assert_eq!(fs::read_to_string(&link).unwrap(), "data");
    }

    #[test]
    fn test_non_result_files_not_linked() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        synchronize(&scan_root, &job_dirs, &options(&output_root)).unwrap();
        assert!(!output_root.join("scan_job/run.sh").exists());
    }

    #[test]
    fn test_clear_links_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        let mut opts = options(&output_root);
        opts.clear_links = true;
        opts.skip_backup = true;

        let first = synchronize(&scan_root, &job_dirs, &opts).unwrap();
        let second = synchronize(&scan_root, &job_dirs, &opts).unwrap();
        assert_eq!(first.links_created, 1);
        assert_eq!(second.links_created, 1);

        let link = output_root.join("scan_job/result.root");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_existing_link_skipped_without_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        let mut opts = options(&output_root);
        opts.skip_backup = true;

        assert_eq!(synchronize(&scan_root, &job_dirs, &opts).unwrap().links_created, 1);
        // second pass finds the link in place and counts nothing new
        assert_eq!(synchronize(&scan_root, &job_dirs, &opts).unwrap().links_created, 0);
    }

    #[test]
    fn test_backup_moves_prefixed_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        // stale output from a previous campaign
        fs::create_dir_all(output_root.join("scan_old")).unwrap();
        fs::write(output_root.join("scan_old/old.root"), "").unwrap();
        fs::create_dir_all(output_root.join("keep_me")).unwrap();

        let outcome = synchronize(&scan_root, &job_dirs, &options(&output_root)).unwrap();
        assert!(outcome.backed_up);
        assert!(!output_root.join("scan_old").exists());
        assert!(output_root.join("keep_me").exists());

        // the stale entry now lives under a timestamped backup directory
        let backup_root = output_root.join("back_up");
        let stamps: Vec<_> = fs::read_dir(&backup_root)
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(stamps.len(), 1);
        assert!(stamps[0].path().join("scan_old/old.root").exists());
    }

    #[test]
    fn test_skip_backup_leaves_output_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        fs::create_dir_all(output_root.join("scan_old")).unwrap();

        let mut opts = options(&output_root);
        opts.skip_backup = true;

        let outcome = synchronize(&scan_root, &job_dirs, &opts).unwrap();
        assert!(!outcome.backed_up);
        assert!(output_root.join("scan_old").exists());
        assert!(!output_root.join("back_up").exists());
    }

    #[test]
    fn test_job_dirs_trigger() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        // output holds a directory named like the job directory, but the
        // prefix is configured to something it does not start with
        fs::create_dir_all(output_root.join("scan_job")).unwrap();

        let mut opts = options(&output_root);
        opts.trigger = BackupTrigger::JobDirs;
        opts.reserved_prefix = "xyz".to_string();

        let outcome = synchronize(&scan_root, &job_dirs, &opts).unwrap();
        assert!(outcome.backed_up);
    }

    #[test]
    fn test_no_backup_when_output_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let job_dirs = build_job_tree(&scan_root);

        let outcome = synchronize(&scan_root, &job_dirs, &options(&output_root)).unwrap();
        assert!(!outcome.backed_up);
    }

    #[test]
    fn test_missing_source_dir_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let output_root = tmp.path().join("root");
        let mut job_dirs = build_job_tree(&scan_root);
        job_dirs.push(scan_root.join("vanished"));

        let outcome = synchronize(&scan_root, &job_dirs, &options(&output_root)).unwrap();
        assert_eq!(outcome.links_created, 1);
    }

    #[test]
    fn test_alternate_source_root() {
        let tmp = tempfile::tempdir().unwrap();
        let scan_root = tmp.path().join("sub");
        let alt_root = tmp.path().join("eos");
        let output_root = tmp.path().join("root");

        // job tree discovered under sub/, data actually lives under eos/
        let job = scan_root.join("scan_job");
        fs::create_dir_all(&job).unwrap();
        let alt_job = alt_root.join("scan_job");
        fs::create_dir_all(&alt_job).unwrap();
        fs::write(alt_job.join("result.root"), "remote").unwrap();

        let mut opts = options(&output_root);
        opts.source_root = Some(alt_root.clone());

        let outcome = synchronize(&scan_root, &[job], &opts).unwrap();
        assert_eq!(outcome.links_created, 1);

        let link = output_root.join("scan_job/result.root");
        let dest = fs::read_link(&link).unwrap();
        assert!(dest.ends_with("eos/scan_job/result.root"));
    }
}
