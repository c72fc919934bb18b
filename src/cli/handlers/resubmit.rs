//! Resubmit stage handler
//!
//! Hands selected jobs back to the batch queue, or previews the selection
//! when no queue was given.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::jobs::classifier::DirReport;
use crate::jobs::resubmit::{BatchSubmitter, Submitter, resubmit_jobs, select_jobs};

/// Handler for the resubmission stage
pub struct ResubmitCommandHandler {
    config: Settings,
}

impl ResubmitCommandHandler {
    /// Create a new resubmit handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Resubmit (or preview) jobs in the configured mode
    ///
    /// Returns the number of jobs selected. Without a configured mode this
    /// stage is a no-op; without a queue it prints the selected job names
    /// and touches nothing.
    pub fn execute(&self, reports: &[DirReport]) -> AppResult<usize> {
        let Some(mode) = self.config.batch.mode else {
            return Ok(0);
        };

        let selected = select_jobs(reports, mode);
        info!(mode = ?mode, selected = selected.len(), "resubmission selection");

        match self.config.batch.queue {
            Some(ref queue) => {
                let submitter = BatchSubmitter::new(&self.config.batch.submit_command);
                self.submit(&selected, queue, &submitter)
            }
            None => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                preview(&selected, &mut out).map_err(|source| AppError::Io {
                    path: "<stdout>".into(),
                    source,
                })?;
                Ok(selected.len())
            }
        }
    }

    /// Submit through the given submitter; split out so tests can record
    /// submissions instead of spawning a queue command
    pub fn submit(
        &self,
        selected: &[&Path],
        queue: &str,
        submitter: &dyn Submitter,
    ) -> AppResult<usize> {
        resubmit_jobs(selected, queue, submitter)
    }
}

/// Print one job basename per line, dry-run style
fn preview(selected: &[&Path], out: &mut impl Write) -> std::io::Result<()> {
    for script in selected {
        if let Some(name) = script.file_name() {
            writeln!(out, "{}", name.to_string_lossy())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::jobs::classifier::{classify_dir, marker_path};
    use crate::jobs::resubmit::ResubmitMode;

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl Submitter for RecordingSubmitter {
        fn submit(&self, script: &Path, queue: &str) -> AppResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((script.to_path_buf(), queue.to_string()));
            Ok(())
        }
    }

    fn reports_with_failure(root: &Path) -> Vec<DirReport> {
        let job = root.join("job");
        fs::create_dir_all(&job).unwrap();
        let failed = job.join("bad.sh");
        fs::write(&failed, "").unwrap();
        fs::write(marker_path(&failed, "fail"), "").unwrap();
        fs::write(job.join("ok.sh"), "").unwrap();
        vec![classify_dir(&job, "sh")]
    }

    #[test]
    fn test_no_mode_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let reports = reports_with_failure(tmp.path());

        let handler = ResubmitCommandHandler::new(Settings::default());
        assert_eq!(handler.execute(&reports).unwrap(), 0);
        // markers untouched
        assert!(marker_path(&tmp.path().join("job/bad.sh"), "fail").exists());
    }

    #[test]
    fn test_dry_run_preview_leaves_markers() {
        let tmp = tempfile::tempdir().unwrap();
        let reports = reports_with_failure(tmp.path());

        let mut settings = Settings::default();
        settings.batch.mode = Some(ResubmitMode::Failed);
        // no queue configured: preview only

        let handler = ResubmitCommandHandler::new(settings);
        assert_eq!(handler.execute(&reports).unwrap(), 1);
        assert!(marker_path(&tmp.path().join("job/bad.sh"), "fail").exists());
    }

    #[test]
    fn test_submit_records_queue() {
        let tmp = tempfile::tempdir().unwrap();
        let reports = reports_with_failure(tmp.path());

        let mut settings = Settings::default();
        settings.batch.mode = Some(ResubmitMode::Failed);
        settings.batch.queue = Some("8nh".to_string());

        let handler = ResubmitCommandHandler::new(settings);
        let submitter = RecordingSubmitter::default();
        let selected = select_jobs(&reports, ResubmitMode::Failed);
        let submitted = handler.submit(&selected, "8nh", &submitter).unwrap();

        assert_eq!(submitted, 1);
        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("job/bad.sh"));
        assert_eq!(calls[0].1, "8nh");
    }

    #[test]
    fn test_preview_prints_basenames() {
        let scripts = [Path::new("/sub/job/a.sh"), Path::new("/sub/job/b.sh")];
        let mut buf = Vec::new();
        preview(&scripts, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a.sh\nb.sh\n");
    }
}
