//! Error types for the rotating logger

use std::io;
use std::path::PathBuf;

/// Result type for rotating logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while writing rotated logs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while writing, flushing or closing a log file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create a log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// A path that must be a directory exists as something else
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to open a log file for appending
    #[error("Failed to open log file at {path}: {source}")]
    OpenFile {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to rotate log file; the worker stops when this happens
    #[error("Failed to rotate log file: {0}")]
    Rotation(String),

    /// Serialization error
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A formatter rejected a record
    #[error("Failed to format record: {0}")]
    Format(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The logger was created outside of a Tokio runtime
    #[error("Rotating logger must be started from within a Tokio runtime")]
    NoRuntime,

    /// The background worker panicked
    #[error("Log worker panicked: {0}")]
    WorkerPanicked(String),
}
