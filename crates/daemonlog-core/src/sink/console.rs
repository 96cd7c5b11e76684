//! Console sink splitting output between stdout and stderr by severity.

use std::io::{self, Write};

use parking_lot::Mutex;

use super::{Flushable, Sink};
use crate::error::{LogError, LogResult};
use crate::record::LogRecord;
use crate::severity::Severity;

/// One of the two console streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl Stream {
    /// Stream that records of `severity` go to, `None` if unmapped.
    pub fn for_severity(severity: Severity) -> Option<Stream> {
        match severity {
            Severity::Debug | Severity::Info | Severity::Warning => Some(Stream::Stdout),
            Severity::Error | Severity::Fatal => Some(Stream::Stderr),
            Severity::Trace => None,
        }
    }
}

type Output = Mutex<Box<dyn Write + Send>>;

/// Sink writing low severities to stdout and high severities to stderr.
pub struct ConsoleSink {
    stdout: Output,
    stderr: Output,
}

impl ConsoleSink {
    /// Sink bound to the process stdout and stderr.
    pub fn new() -> Self {
        Self::with_streams(io::stdout(), io::stderr())
    }

    /// Sink bound to arbitrary writers standing in for stdout and stderr.
    pub fn with_streams(
        stdout: impl Write + Send + 'static,
        stderr: impl Write + Send + 'static,
    ) -> Self {
        Self {
            stdout: Mutex::new(Box::new(stdout)),
            stderr: Mutex::new(Box::new(stderr)),
        }
    }

    fn output(&self, stream: Stream) -> &Output {
        match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn accepts(&self, severity: Severity) -> bool {
        Stream::for_severity(severity).is_some()
    }

    fn write(&self, record: &LogRecord, line: &[u8]) -> LogResult<()> {
        let stream =
            Stream::for_severity(record.severity).ok_or(LogError::Routing(record.severity))?;

        self.output(stream)
            .lock()
            .write_all(line)
            .map_err(|e| LogError::Delivery(format!("could not write to {:?}: {}", stream, e)))
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        Some(self)
    }
}

impl Flushable for ConsoleSink {
    fn flush(&self) -> LogResult<()> {
        for stream in [Stream::Stdout, Stream::Stderr] {
            self.output(stream)
                .lock()
                .flush()
                .map_err(|e| LogError::Delivery(format!("could not flush {:?}: {}", stream, e)))?;
        }
        Ok(())
    }
}
