//! Plain-text line formatter.
//!
//! Every sink receives the same bytes, produced once per record:
//!
//! ```text
//! 2026-01-21 14:30:45.123456 4242 [INFO]: volume attached
//! ```

use std::io::Write;

use crate::error::{LogError, LogResult};
use crate::record::LogRecord;
use crate::severity::Severity;

/// Timestamp pattern used by [`PlainTextFormatter`]: local time, microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Tag written for severities without a rendering.
pub const UNKNOWN_TAG: &str = "UNKNOWN";

/// Converts a record into the bytes handed to sinks.
pub trait Formatter: Send + Sync {
    /// Render `record`. Must not depend on anything but the record and the
    /// formatter's own fixed settings.
    fn format(&self, record: &LogRecord) -> LogResult<Vec<u8>>;
}

/// Formatter that writes one uncolored line per record, without key/value
/// pairs.
#[derive(Debug, Clone)]
pub struct PlainTextFormatter {
    timestamp_format: String,
}

impl PlainTextFormatter {
    /// Formatter using [`TIMESTAMP_FORMAT`].
    pub fn new() -> Self {
        Self::with_timestamp_format(TIMESTAMP_FORMAT)
    }

    /// Formatter using a custom `chrono` strftime pattern.
    pub fn with_timestamp_format(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for PlainTextFormatter {
    fn format(&self, record: &LogRecord) -> LogResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(64 + record.message.len());
        writeln!(
            buf,
            "{} {} [{}]: {}",
            record.timestamp.format(&self.timestamp_format),
            record.pid,
            record.severity.tag().unwrap_or(UNKNOWN_TAG),
            record.message
        )
        .map_err(|e| LogError::Delivery(format!("could not format log entry: {}", e)))?;
        Ok(buf)
    }
}

/// The pieces of a line produced by [`PlainTextFormatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// Timestamp text as written
    pub timestamp: &'a str,
    /// Process id
    pub pid: u32,
    /// Severity tag without brackets
    pub tag: &'a str,
    /// Message text
    pub message: &'a str,
}

impl ParsedLine<'_> {
    /// The severity named by the tag, `None` for `UNKNOWN` or foreign tags.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_tag(self.tag)
    }
}

/// Split a line written with the default timestamp pattern back into its parts.
///
/// A single trailing newline is ignored. Returns `None` for anything that
/// does not look like a formatter line.
pub fn parse_line(line: &str) -> Option<ParsedLine<'_>> {
    let line = line.strip_suffix('\n').unwrap_or(line);

    // Date and time are separated by a space, so the timestamp spans two fields.
    let mut fields = line.splitn(4, ' ');
    let date = fields.next()?;
    let time = fields.next()?;
    let pid = fields.next()?.parse().ok()?;
    let rest = fields.next()?;

    let timestamp = &line[..date.len() + 1 + time.len()];
    let rest = rest.strip_prefix('[')?;
    let (tag, message) = rest.split_once("]: ")?;

    Some(ParsedLine {
        timestamp,
        pid,
        tag,
        message,
    })
}
