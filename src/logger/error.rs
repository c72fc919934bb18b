//! Logger error types

use thiserror::Error;

/// Errors raised while setting up the logger
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The configured log level does not parse
    #[error("Invalid log level '{0}'. Valid levels are: trace, debug, info, warn, error")]
    InvalidLevel(String),

    /// The log file could not be opened
    #[error("Failed to open log file")]
    Io(#[from] std::io::Error),
}
