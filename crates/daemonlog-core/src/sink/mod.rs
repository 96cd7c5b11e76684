//! Destinations for formatted log lines.
//!
//! A [`Sink`] receives the bytes produced by the formatter together with the
//! record they came from. Flushing and closing are optional capabilities: a
//! sink that supports them hands out a trait object through
//! [`Sink::as_flushable`] / [`Sink::as_closable`], everything else is skipped
//! by the logger.

pub mod console;
pub mod file;

pub use console::{ConsoleSink, Stream};
pub use file::{FileSink, DEFAULT_ROTATION_BYTES};

use crate::error::LogResult;
use crate::record::LogRecord;
use crate::severity::Severity;

/// A destination for formatted log lines.
pub trait Sink: Send + Sync {
    /// Whether this sink wants records of `severity`.
    fn accepts(&self, severity: Severity) -> bool;

    /// Deliver one formatted line.
    fn write(&self, record: &LogRecord, line: &[u8]) -> LogResult<()>;

    /// Flush capability, if the sink has one.
    fn as_flushable(&self) -> Option<&dyn Flushable> {
        None
    }

    /// Close capability, if the sink has one.
    fn as_closable(&self) -> Option<&dyn Closable> {
        None
    }
}

/// Sinks that buffer or cache and can push data to its final destination.
pub trait Flushable {
    /// Push pending data down.
    fn flush(&self) -> LogResult<()>;
}

/// Sinks that hold a resource which should be released before exit.
pub trait Closable {
    /// Release the resource. Later writes fail with a delivery error.
    fn close(&self) -> LogResult<()>;
}
