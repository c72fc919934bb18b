//! Check stage handler
//!
//! Runs the scan and classification pass and prints the status report.

use std::io::Write;
use std::path::PathBuf;

use jiff::tz::TimeZone;
use regex::Regex;
use tracing::debug;

use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::jobs::classifier::{DirReport, classify_dir};
use crate::jobs::report::Summary;
use crate::jobs::scanner::{ScanFilter, scan_job_dirs};

/// Handler for the scan/classify/report stage
pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    /// Create a new check handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Scan, classify and print the status report
    ///
    /// Returns the discovered job directories and their classification so
    /// the resubmission and synchronization stages can act on them.
    pub fn execute(&self, json: bool) -> AppResult<(Vec<PathBuf>, Vec<DirReport>)> {
        let (dirs, reports) = self.classify()?;

        let summary = Summary::from_reports(&reports);
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let rendered = if json {
            summary.render_json(&mut out)
        } else {
            summary.render_text(&mut out)
        };
        rendered.map_err(|source| AppError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })?;
        out.flush().ok();

        Ok((dirs, reports))
    }

    /// Scan and classify without rendering anything
    pub fn classify(&self) -> AppResult<(Vec<PathBuf>, Vec<DirReport>)> {
        let filter = self.scan_filter()?;
        let dirs = scan_job_dirs(&self.config.scan.root, &filter);
        let reports: Vec<DirReport> = dirs
            .iter()
            .map(|dir| classify_dir(dir, &self.config.scan.script_ext))
            .collect();

        debug!(
            dirs = dirs.len(),
            scripts = reports.iter().map(DirReport::total).sum::<usize>(),
            "classification finished"
        );
        Ok((dirs, reports))
    }

    /// Build the scan filter from the merged settings
    fn scan_filter(&self) -> AppResult<ScanFilter> {
        let regex = match self.config.scan.regex {
            Some(ref pattern) => {
                Some(Regex::new(pattern).map_err(|e| AppError::Validation {
                    field: "scan.regex".to_string(),
                    reason: e.to_string(),
                })?)
            }
            None => None,
        };

        // The threshold is the configured day at local midnight.
        let min_mtime = match self.config.scan.date {
            Some(date) => Some(
                date.to_zoned(TimeZone::system())
                    .map_err(|e| AppError::Validation {
                        field: "scan.date".to_string(),
                        reason: e.to_string(),
                    })?
                    .timestamp(),
            ),
            None => None,
        };

        Ok(ScanFilter { regex, min_mtime })
    }
}
