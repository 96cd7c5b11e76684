//! The process-wide logger.
//!
//! Exactly one [`Logger`] is installed by [`init_logging`] and used by the
//! logging macros until the process exits. There is no default instance:
//! logging through the macros before initialization panics, and
//! [`try_logger`], [`flush`] and [`close`] report
//! [`LogError::NotInitialized`].

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{LoggingConfig, SinkFamily, ValidatedConfig};
use crate::error::{LogError, LogResult};
use crate::logger::Logger;
use crate::severity::Severity;
use crate::sink::{ConsoleSink, FileSink, Sink};

/// Exit status used after a fatal record has been logged.
pub const FATAL_EXIT_CODE: i32 = 255;

static LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// Validate `config`, build its sink and install the result as the process
/// logger.
///
/// `name` becomes the file stem for the file family (`<log_dir>/<name>.log`).
/// On error nothing is installed and any previous logger stays in place.
/// A previous logger that gets replaced is closed.
pub fn init_logging(name: &str, config: &LoggingConfig) -> LogResult<()> {
    let validated = config.validate()?;
    let logger = build_logger(name, &validated)?;
    install(logger);
    Ok(())
}

/// Build the logger described by `config` without installing it.
pub fn build_logger(name: &str, config: &ValidatedConfig) -> LogResult<Logger> {
    let sink: Box<dyn Sink> = match config.family {
        SinkFamily::File => Box::new(FileSink::new(
            config.log_file_path(name),
            config.rotation_bytes,
        )?),
        SinkFamily::Console => Box::new(ConsoleSink::new()),
    };
    Ok(Logger::new(config.threshold, vec![sink]))
}

/// Install an already-built logger, closing the one it replaces.
pub fn install(logger: Logger) {
    let previous = LOGGER.write().replace(Arc::new(logger));
    if let Some(previous) = previous {
        report("close", previous.close());
        tracing::debug!("replaced process logger");
    }
}

/// The installed logger.
pub fn try_logger() -> LogResult<Arc<Logger>> {
    LOGGER.read().clone().ok_or(LogError::NotInitialized)
}

/// Whether [`init_logging`] has succeeded in this process.
pub fn is_initialized() -> bool {
    LOGGER.read().is_some()
}

/// Log a preformatted message through the installed logger.
///
/// # Panics
///
/// Panics if no logger is installed.
pub fn log(severity: Severity, args: fmt::Arguments<'_>) {
    let logger = match try_logger() {
        Ok(logger) => logger,
        Err(_) => panic!("logging used before init_logging: {}", args),
    };

    // Skip formatting for filtered records; unmapped ones still go through
    // so the logger can report them.
    if severity.is_mapped() && severity < logger.threshold() {
        return;
    }
    logger.log(severity, &args.to_string());
}

/// Log at fatal severity, flush, and exit with [`FATAL_EXIT_CODE`].
pub fn log_fatal(args: fmt::Arguments<'_>) -> ! {
    log(Severity::Fatal, args);
    let _ = flush();
    std::process::exit(FATAL_EXIT_CODE)
}

/// Flush every sink of the installed logger that supports it.
///
/// Per-sink failures are reported on stderr.
pub fn flush() -> LogResult<()> {
    report("flush", try_logger()?.flush());
    Ok(())
}

/// Close every sink of the installed logger that supports it.
///
/// The logger stays installed; lines logged afterwards to a closed sink are
/// reported as delivery failures.
pub fn close() -> LogResult<()> {
    report("close", try_logger()?.close());
    Ok(())
}

fn report(operation: &str, failures: Vec<LogError>) {
    for failure in failures {
        eprintln!("Unable to {} log sink: {}", operation, failure);
    }
}

/// Log a debug message through the process logger.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::global::log($crate::Severity::Debug, format_args!($($arg)*))
    };
}

/// Log an info message through the process logger.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::global::log($crate::Severity::Info, format_args!($($arg)*))
    };
}

/// Log a warning through the process logger.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::global::log($crate::Severity::Warning, format_args!($($arg)*))
    };
}

/// Log an error through the process logger.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::global::log($crate::Severity::Error, format_args!($($arg)*))
    };
}

/// Log a fatal message through the process logger, then exit with status 255.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::global::log_fatal(format_args!($($arg)*))
    };
}
