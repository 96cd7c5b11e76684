//! Ordered log severities.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Severity of a log record, ordered from least to most severe.
///
/// `Trace` exists so producers with a finer scale (the `tracing` bridge) can
/// be represented faithfully. It has no rendering tag and no console stream,
/// and the [`Logger`](crate::Logger) rejects it before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Finer than anything the facility renders
    Trace,
    /// Diagnostic detail
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected, still working
    Warning,
    /// An operation failed
    Error,
    /// The process cannot continue
    Fatal,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    /// The tag written between brackets, or `None` when unmapped.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Severity::Debug => Some("DEBUG"),
            Severity::Info => Some("INFO"),
            Severity::Warning => Some("WARNING"),
            Severity::Error => Some("ERROR"),
            Severity::Fatal => Some("FATAL"),
            Severity::Trace => None,
        }
    }

    /// Whether the facility knows how to render and route this severity.
    pub fn is_mapped(self) -> bool {
        self.tag().is_some()
    }

    /// Inverse of [`Severity::tag`].
    pub fn from_tag(tag: &str) -> Option<Severity> {
        Severity::ALL.into_iter().find(|s| s.tag() == Some(tag))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Parses a configured threshold. Only the five mapped names are accepted.
impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(LogError::Configuration(format!(
                "invalid logging level [{}]",
                other
            ))),
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::DEBUG => Severity::Debug,
            _ => Severity::Trace,
        }
    }
}
