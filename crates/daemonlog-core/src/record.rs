//! Log record passed from the logger to the formatter and sinks.

use chrono::{DateTime, Local};

use crate::severity::Severity;

/// A single log event.
///
/// Built once per accepted log call and consumed synchronously; only its
/// formatted bytes are ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the call was made
    pub timestamp: DateTime<Local>,
    /// Severity of the event
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Id of the emitting process
    pub pid: u32,
}

impl LogRecord {
    /// Create a record stamped with the current time and process id.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self::at(Local::now(), severity, message, std::process::id())
    }

    /// Create a record with every field supplied by the caller.
    pub fn at(
        timestamp: DateTime<Local>,
        severity: Severity,
        message: impl Into<String>,
        pid: u32,
    ) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
            pid,
        }
    }
}
