//! Benchmarks for the logging hot path
//!
//! Run with: cargo bench -p daemonlog-core
//!
//! These benchmarks establish baselines for:
//! - Formatting a record
//! - Appending through the file sink, including the rotation check
//! - Filtered calls that never reach a sink

use std::io;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use daemonlog_core::{
    ConsoleSink, FileSink, Formatter, LogRecord, Logger, PlainTextFormatter, Severity, Sink,
};
use tempfile::TempDir;

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_format(c: &mut Criterion) {
    let formatter = PlainTextFormatter::new();
    let record = LogRecord::new(Severity::Info, "NodeStageVolume for pvc-0123 succeeded");

    c.bench_function("format_record", |b| {
        b.iter(|| black_box(formatter.format(black_box(&record)).unwrap()))
    });
}

// ============================================================================
// Sink Benchmarks
// ============================================================================

fn bench_file_sink(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_sink");
    let temp = TempDir::new().unwrap();
    let line = b"2026-01-21 14:30:45.123456 4242 [INFO]: NodeStageVolume for pvc-0123 succeeded\n";
    let record = LogRecord::new(Severity::Info, "x");
    group.throughput(Throughput::Bytes(line.len() as u64));

    // Large threshold: measures append plus the unlocked size check
    let sink = FileSink::new(temp.path().join("steady.log"), u64::MAX).unwrap();
    group.bench_function("append_no_rotation", |b| {
        b.iter(|| sink.write(&record, black_box(line)).unwrap())
    });

    // Small threshold: rotation every ~50 lines
    let sink = FileSink::new(temp.path().join("rotating.log"), 4096).unwrap();
    group.bench_function("append_with_rotation", |b| {
        b.iter(|| sink.write(&record, black_box(line)).unwrap())
    });

    group.finish();
}

// ============================================================================
// Logger Benchmarks
// ============================================================================

fn bench_logger(c: &mut Criterion) {
    let logger = Logger::new(
        Severity::Warning,
        vec![Box::new(ConsoleSink::with_streams(io::sink(), io::sink()))],
    );

    c.bench_function("log_filtered", |b| {
        b.iter(|| logger.log(black_box(Severity::Debug), "ignored"))
    });

    c.bench_function("log_delivered", |b| {
        b.iter(|| logger.log(black_box(Severity::Error), "delivered"))
    });
}

criterion_group!(format_benches, bench_format);

criterion_group!(sink_benches, bench_file_sink, bench_logger);

criterion_main!(format_benches, sink_benches);
