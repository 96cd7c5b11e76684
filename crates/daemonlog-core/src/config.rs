//! Logging configuration.
//!
//! Settings arrive as plain strings (command-line flags in the daemon) and are
//! validated once, before anything is constructed. Nothing here touches the
//! filesystem.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LogError, LogResult};
use crate::severity::Severity;
use crate::sink::DEFAULT_ROTATION_BYTES;

/// Directory used for the file family when none is configured.
pub const DEFAULT_LOG_DIR: &str = "/var/log/daemonlog";

/// Which sink family the logger writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFamily {
    /// Rotating file under the log directory
    File,
    /// stdout/stderr split by severity
    Console,
}

impl FromStr for SinkFamily {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(SinkFamily::File),
            "console" => Ok(SinkFamily::Console),
            other => Err(LogError::Configuration(format!(
                "invalid logging module [{}]",
                other
            ))),
        }
    }
}

impl fmt::Display for SinkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkFamily::File => f.write_str("file"),
            SinkFamily::Console => f.write_str("console"),
        }
    }
}

/// Raw, unvalidated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `file` or `console`
    pub module: String,
    /// `debug`, `info`, `warning`, `error` or `fatal`
    pub level: String,
    /// Directory for the log file (file family only)
    pub log_dir: PathBuf,
    /// Rotation threshold: `<n>`, `<n>K` or `<n>M`
    pub file_size: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            module: "file".to_string(),
            level: "info".to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_size: DEFAULT_ROTATION_BYTES.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Console logging at `level`.
    pub fn console(level: impl Into<String>) -> Self {
        Self {
            module: "console".to_string(),
            level: level.into(),
            ..Self::default()
        }
    }

    /// File logging at `level` into `log_dir`.
    pub fn file(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            module: "file".to_string(),
            level: level.into(),
            log_dir: log_dir.into(),
            ..Self::default()
        }
    }

    /// Builder-style method for the rotation threshold.
    pub fn with_file_size(mut self, file_size: impl Into<String>) -> Self {
        self.file_size = file_size.into();
        self
    }

    /// Check every setting and convert it to its typed form.
    ///
    /// The rotation threshold is only parsed for the file family.
    pub fn validate(&self) -> LogResult<ValidatedConfig> {
        let family: SinkFamily = self.module.parse()?;
        let threshold: Severity = self.level.parse()?;
        let rotation_bytes = match family {
            SinkFamily::File => parse_size(&self.file_size)?,
            SinkFamily::Console => DEFAULT_ROTATION_BYTES,
        };

        Ok(ValidatedConfig {
            family,
            threshold,
            log_dir: self.log_dir.clone(),
            rotation_bytes,
        })
    }
}

/// Settings after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Selected sink family
    pub family: SinkFamily,
    /// Minimum severity delivered
    pub threshold: Severity,
    /// Directory for the log file
    pub log_dir: PathBuf,
    /// Rotation threshold in bytes
    pub rotation_bytes: u64,
}

impl ValidatedConfig {
    /// `<log_dir>/<name>.log`
    pub fn log_file_path(&self, name: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", name))
    }
}

/// Parse a size threshold into bytes.
///
/// Accepts a bare byte count, or a count followed by `B`, `K` (KiB) or `M`
/// (MiB), case-insensitive. Zero, negative, overflowing and otherwise
/// malformed values are configuration errors.
pub fn parse_size(value: &str) -> LogResult<u64> {
    let invalid = || LogError::Configuration(format!("invalid log file size [{}]", value));

    let upper = value.trim().to_ascii_uppercase();
    let last = upper.chars().last().ok_or_else(invalid)?;

    let (digits, multiplier) = match last {
        '0'..='9' => (upper.as_str(), 1),
        'B' => (&upper[..upper.len() - 1], 1),
        'K' => (&upper[..upper.len() - 1], 1024),
        'M' => (&upper[..upper.len() - 1], 1024 * 1024),
        _ => return Err(invalid()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let magnitude: u64 = digits.parse().map_err(|_| invalid())?;
    match magnitude.checked_mul(multiplier) {
        Some(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(invalid()),
    }
}
