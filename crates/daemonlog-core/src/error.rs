//! Error types for the logging facility

use std::path::PathBuf;

use thiserror::Error;

use crate::severity::Severity;

/// Main error type for logging operations
#[derive(Error, Debug)]
pub enum LogError {
    /// A configuration value was rejected during initialization
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The log directory path exists but is something other than a directory
    #[error("Log path {} exists and is not a directory, please remove it", .path.display())]
    NotADirectory {
        /// The offending path
        path: PathBuf,
    },

    /// The log directory could not be created
    #[error("Could not create log directory {}: {source}", .path.display())]
    CreateDirectory {
        /// The directory that failed to be created
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// The log file could not be opened
    #[error("Could not open log file {}: {source}", .path.display())]
    OpenFile {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// A single line could not be formatted or written
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The active log file could not be renamed or reopened
    #[error("Failed to rotate log file {}: {source}", .path.display())]
    Rotation {
        /// The active log file path
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// No output stream is mapped to the severity
    #[error("No destination stream for log level {0}")]
    Routing(Severity),

    /// The process-wide logger was used before `init_logging`
    #[error("Logging has not been initialized")]
    NotInitialized,
}

/// Coarse classification of [`LogError`] used by callers deciding how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid settings; initialization aborts
    Configuration,
    /// Filesystem resources unavailable; initialization aborts
    Resource,
    /// A line was lost; recovered locally
    Delivery,
    /// A line had nowhere to go; recovered locally
    Routing,
}

impl LogError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::Configuration(_) | LogError::NotADirectory { .. } => {
                ErrorKind::Configuration
            }
            LogError::CreateDirectory { .. } | LogError::OpenFile { .. } => ErrorKind::Resource,
            LogError::Delivery(_) | LogError::Rotation { .. } => ErrorKind::Delivery,
            LogError::Routing(_) => ErrorKind::Routing,
            LogError::NotInitialized => ErrorKind::Configuration,
        }
    }
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
