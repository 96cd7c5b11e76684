//! daemonlog CLI
//!
//! Thin wrapper around daemonlog-core for trying out a logging configuration
//! from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Validate settings and show what they resolve to
//! daemonlog --log-file-dir /tmp/logs --log-file-size 10K check
//!
//! # Write 1000 info lines from 8 threads into /tmp/logs/csi.log
//! daemonlog --name csi --log-file-dir /tmp/logs emit --count 1000 --threads 8
//!
//! # Console output: info to stdout, error to stderr
//! daemonlog --logging-module console emit --severity error --message "array offline"
//!
//! # Count lines per severity in a log file and its rotated siblings
//! daemonlog inspect /tmp/logs/csi.log /tmp/logs/csi.log20260121-143045
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daemonlog_core::{
    parse_line, LoggerLayer, LoggingConfig, Severity, DEFAULT_LOG_DIR, DEFAULT_ROTATION_BYTES,
};
use tracing_subscriber::prelude::*;

/// daemonlog - Process-wide logging for daemons
#[derive(Parser)]
#[command(name = "daemonlog")]
#[command(version = "0.1.0")]
#[command(about = "daemonlog - configure, exercise and inspect daemon logging")]
struct Cli {
    /// Logging module: file or console
    #[arg(long, default_value = "file", global = true)]
    logging_module: String,

    /// Logging level: debug, info, warning, error or fatal
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log directory (file module only)
    #[arg(long, default_value = DEFAULT_LOG_DIR, global = true)]
    log_file_dir: PathBuf,

    /// Maximum log file size before rotation: <n>, <n>K or <n>M
    #[arg(long, default_value_t = DEFAULT_ROTATION_BYTES.to_string(), global = true)]
    log_file_size: String,

    /// Log name; the file module writes <log-file-dir>/<name>.log
    #[arg(long, default_value = "daemonlog", global = true)]
    name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the logging settings and print the resolved values
    Check,

    /// Initialize logging and write lines through it
    Emit {
        /// Severity of the lines: debug, info, warning, error or fatal
        #[arg(short, long, default_value = "info")]
        severity: Severity,

        /// Lines to write per thread
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Concurrent writers
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Message text; each line is suffixed with its thread and sequence number
        #[arg(short, long, default_value = "hello from daemonlog")]
        message: String,
    },

    /// Count lines per severity in one or more log files
    Inspect {
        /// Log files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            module: self.logging_module.clone(),
            level: self.log_level.clone(),
            log_dir: self.log_file_dir.clone(),
            file_size: self.log_file_size.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check => check(&cli),
        Commands::Emit {
            severity,
            count,
            threads,
            message,
        } => emit(&cli, *severity, *count, *threads, message),
        Commands::Inspect { files } => inspect(files),
    }
}

fn check(cli: &Cli) -> Result<()> {
    let validated = cli
        .logging_config()
        .validate()
        .context("invalid logging configuration")?;

    println!("Logging configuration:");
    println!("  Module:    {}", validated.family);
    println!("  Level:     {}", validated.threshold);
    if validated.family == daemonlog_core::SinkFamily::File {
        println!("  File:      {}", validated.log_file_path(&cli.name).display());
        println!("  Rotate at: {} bytes", validated.rotation_bytes);
    }
    Ok(())
}

fn emit(cli: &Cli, severity: Severity, count: usize, threads: usize, message: &str) -> Result<()> {
    daemonlog_core::init_logging(&cli.name, &cli.logging_config())
        .context("could not initialize logging")?;

    // Route this binary's own tracing output through the facility as well.
    tracing_subscriber::registry()
        .with(LoggerLayer::process())
        .init();
    tracing::debug!(threads, count, "emitting {} lines", threads * count);

    if severity == Severity::Fatal {
        daemonlog_core::fatal!("{}", message);
    }

    thread::scope(|scope| {
        for t in 0..threads.max(1) {
            scope.spawn(move || {
                for i in 0..count {
                    daemonlog_core::global::log(
                        severity,
                        format_args!("{} thread={} seq={}", message, t, i),
                    );
                }
            });
        }
    });

    daemonlog_core::flush()?;
    daemonlog_core::close()?;
    Ok(())
}

fn inspect(files: &[PathBuf]) -> Result<()> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut unparsed = 0;

    for file in files {
        let content = fs::read_to_string(file)
            .with_context(|| format!("could not read {}", file.display()))?;
        for line in content.lines() {
            match parse_line(line) {
                Some(parsed) => *counts.entry(parsed.tag.to_string()).or_default() += 1,
                None => unparsed += 1,
            }
        }
    }

    let total: usize = counts.values().sum::<usize>() + unparsed;
    println!("Lines: {}", total);
    for severity in Severity::ALL {
        if let Some(tag) = severity.tag() {
            println!("  {:<8} {}", tag, counts.remove(tag).unwrap_or(0));
        }
    }
    for (tag, n) in counts {
        println!("  {:<8} {}", tag, n);
    }
    if unparsed > 0 {
        println!("  {:<8} {}", "unparsed", unparsed);
    }
    Ok(())
}
