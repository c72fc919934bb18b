//! Batch job polling modules
//!
//! Discovery, marker-file classification, reporting, resubmission and output
//! synchronization for farm jobs. The modules are deliberately independent:
//! classification is a pure function of the filesystem, reporting renders
//! classification results, and the resubmission/synchronization drivers act
//! on them.

pub mod classifier;
pub mod report;
pub mod resubmit;
pub mod scanner;
pub mod sync;

pub use classifier::{DirReport, JobStatus, classify_dir};
pub use report::Summary;
pub use resubmit::{BatchSubmitter, ResubmitMode, Submitter};
pub use scanner::{ScanFilter, scan_job_dirs};
pub use sync::{BackupTrigger, SyncOptions, SyncOutcome, synchronize};
