//! daemonlog core library
//!
//! Process-wide logging for long-running daemons: one logger, installed once,
//! writing plain-text lines either to a size-rotated file or to the console
//! split by severity.
//!
//! ## Overview
//!
//! ```text
//! debug!/info!/...  ──▶  Logger ──▶ threshold ──▶ Formatter ──▶ Sink(s)
//! tracing events    ──▶  LoggerLayer ──┘                        ├─ FileSink (rotating)
//!                                                               └─ ConsoleSink (stdout/stderr)
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use daemonlog_core::{info, error, LoggingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LoggingConfig::file("info", "/var/log/daemonlog").with_file_size("20M");
//!     daemonlog_core::init_logging("csi-driver", &config)?;
//!
//!     info!("driver {} starting", env!("CARGO_PKG_VERSION"));
//!     error!("could not reach {}", "array-01");
//!
//!     daemonlog_core::flush()?;
//!     daemonlog_core::close()?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod formatter;
pub mod global;
pub mod logger;
pub mod record;
pub mod severity;
pub mod sink;

// Re-exports
pub use bridge::LoggerLayer;
pub use config::{parse_size, LoggingConfig, SinkFamily, ValidatedConfig, DEFAULT_LOG_DIR};
pub use error::{ErrorKind, LogError, LogResult};
pub use formatter::{parse_line, Formatter, ParsedLine, PlainTextFormatter, TIMESTAMP_FORMAT};
pub use global::{
    build_logger, close, flush, init_logging, install, is_initialized, try_logger,
    FATAL_EXIT_CODE,
};
pub use logger::{Dispatch, Logger};
pub use record::LogRecord;
pub use severity::Severity;
pub use sink::{Closable, ConsoleSink, FileSink, Flushable, Sink, Stream, DEFAULT_ROTATION_BYTES};
