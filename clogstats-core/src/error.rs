//! Error types for clogstats-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the clogstats-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A log line without the expected fields or with an unparseable timestamp
    #[error("malformed line {line} in {}: {reason}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The log directory to discover sources in does not exist
    #[error("log directory not found: {}", .0.display())]
    LogDirNotFound(PathBuf),

    /// Source discovery pattern could not be compiled
    #[error("invalid source pattern: {0}")]
    InvalidPattern(String),

    /// Interval splitting was asked for something it cannot produce
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for clogstats-core
pub type Result<T> = std::result::Result<T, Error>;
