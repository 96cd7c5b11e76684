//! Record dispatch and sink lifecycle.

use std::sync::Arc;

use crate::error::{LogError, LogResult};
use crate::formatter::{Formatter, PlainTextFormatter};
use crate::record::LogRecord;
use crate::severity::Severity;
use crate::sink::Sink;

/// Outcome of a single [`Logger::try_log`] call.
#[derive(Debug)]
pub enum Dispatch {
    /// Below the threshold; nothing was formatted or written
    Filtered,
    /// Formatted once and offered to every accepting sink
    Delivered {
        /// Number of sinks that received the line
        sinks: usize,
        /// Per-sink failures, in sink order
        failures: Vec<LogError>,
    },
}

/// Fans formatted records out to an ordered list of sinks.
///
/// The sink list, formatter and threshold are fixed at construction, so
/// dispatch needs no locking of its own; each sink handles its own
/// concurrency.
pub struct Logger {
    sinks: Vec<Box<dyn Sink>>,
    threshold: Severity,
    formatter: Arc<dyn Formatter>,
}

impl Logger {
    /// Logger using the plain-text formatter.
    pub fn new(threshold: Severity, sinks: Vec<Box<dyn Sink>>) -> Self {
        Self::with_formatter(threshold, Arc::new(PlainTextFormatter::new()), sinks)
    }

    /// Logger with a caller-supplied formatter.
    pub fn with_formatter(
        threshold: Severity,
        formatter: Arc<dyn Formatter>,
        sinks: Vec<Box<dyn Sink>>,
    ) -> Self {
        Self {
            sinks,
            threshold,
            formatter,
        }
    }

    /// Minimum severity this logger delivers.
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Whether a record of `severity` would be delivered.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        severity.is_mapped() && severity >= self.threshold
    }

    /// Number of configured sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Format and deliver one message, reporting what happened.
    ///
    /// Unmapped severities are rejected before formatting. Sink failures do
    /// not stop delivery to the remaining sinks; they are collected in
    /// [`Dispatch::Delivered::failures`].
    pub fn try_log(&self, severity: Severity, message: &str) -> LogResult<Dispatch> {
        if !severity.is_mapped() {
            return Err(LogError::Routing(severity));
        }
        if severity < self.threshold {
            return Ok(Dispatch::Filtered);
        }

        let record = LogRecord::new(severity, message);
        let line = self.formatter.format(&record)?;

        let mut sinks = 0;
        let mut failures = Vec::new();
        for sink in self.sinks.iter().filter(|s| s.accepts(severity)) {
            sinks += 1;
            if let Err(e) = sink.write(&record, &line) {
                failures.push(e);
            }
        }

        Ok(Dispatch::Delivered { sinks, failures })
    }

    /// Format and deliver one message. Failures go to stderr.
    pub fn log(&self, severity: Severity, message: &str) {
        match self.try_log(severity, message) {
            Ok(Dispatch::Filtered) => {}
            Ok(Dispatch::Delivered { failures, .. }) => {
                for failure in failures {
                    eprintln!("Unable to deliver log entry: {}", failure);
                }
            }
            Err(e) => eprintln!("Unable to log entry: {}", e),
        }
    }

    /// Flush every sink that can be flushed.
    pub fn flush(&self) -> Vec<LogError> {
        self.sinks
            .iter()
            .filter_map(|s| s.as_flushable())
            .filter_map(|f| f.flush().err())
            .collect()
    }

    /// Close every sink that can be closed. Sinks without the capability are
    /// left alone.
    pub fn close(&self) -> Vec<LogError> {
        self.sinks
            .iter()
            .filter_map(|s| s.as_closable())
            .filter_map(|c| c.close().err())
            .collect()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sinks.len())
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
