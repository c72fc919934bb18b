//! Command handlers for CLI operations
//!
//! This module contains handlers for the stages of a run (check, resubmit,
//! synchronize), separating execution logic from parsing and validation.

pub mod check;
pub mod resubmit;
pub mod sync;

pub use check::CheckCommandHandler;
pub use resubmit::ResubmitCommandHandler;
pub use sync::SyncCommandHandler;
