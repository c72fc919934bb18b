//! Status aggregation and rendering
//!
//! Classification and reporting are decoupled: `Summary::from_reports`
//! aggregates the per-directory results into plain counters, and the render
//! methods write them to any `io::Write`, so tests never have to capture
//! the console.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use super::classifier::{DirReport, JobStatus};

/// Categories in the order the report prints them
const REPORT_ORDER: [JobStatus; 4] = [
    JobStatus::Queued,
    JobStatus::Failed,
    JobStatus::Running,
    JobStatus::Done,
];

/// Counters for one directory or for the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub queued: usize,
    pub failed: usize,
    pub running: usize,
    pub done: usize,
    pub total: usize,
}

impl Tally {
    fn from_report(report: &DirReport) -> Self {
        Self {
            queued: report.queued.len(),
            failed: report.failed.len(),
            running: report.running.len(),
            done: report.done.len(),
            total: report.total(),
        }
    }

    fn add(&mut self, other: &Tally) {
        self.queued += other.queued;
        self.failed += other.failed;
        self.running += other.running;
        self.done += other.done;
        self.total += other.total;
    }

    fn count(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Queued => self.queued,
            JobStatus::Failed => self.failed,
            JobStatus::Running => self.running,
            JobStatus::Done => self.done,
        }
    }
}

/// Counters for a single job directory
#[derive(Debug, Clone, Serialize)]
pub struct DirSummary {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Aggregated status counts across all scanned directories
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub dirs: Vec<DirSummary>,
    pub total: Tally,
}

impl Summary {
    /// Aggregate the per-directory classification results
    pub fn from_reports(reports: &[DirReport]) -> Self {
        let mut total = Tally::default();
        let dirs = reports
            .iter()
            .map(|report| {
                let tally = Tally::from_report(report);
                total.add(&tally);
                DirSummary {
                    dir: report.dir.clone(),
                    tally,
                }
            })
            .collect();

        Self { dirs, total }
    }

    /// Render the human-readable report
    ///
    /// Every directory prints its path followed by one line per non-empty
    /// category; all-zero categories are omitted. A TOTAL block with the
    /// same rule closes the report.
    pub fn render_text(&self, out: &mut impl io::Write) -> io::Result<()> {
        for dir in &self.dirs {
            writeln!(out, "{}", dir.dir.display())?;
            write_tally(out, &dir.tally)?;
        }
        writeln!(out, "TOTAL")?;
        write_tally(out, &self.total)?;
        Ok(())
    }

    /// Render the summary as pretty-printed JSON
    pub fn render_json(&self, out: &mut impl io::Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self).map_err(io::Error::other)?;
        writeln!(out)
    }
}

fn write_tally(out: &mut impl io::Write, tally: &Tally) -> io::Result<()> {
    for status in REPORT_ORDER {
        let count = tally.count(status);
        if count > 0 {
            writeln!(out, "\t{}: {}/{}", status.label(), count, tally.total)?;
        }
    }
    Ok(())
}
