//! Custom tracing Layer that forwards events to a [`Logger`].
//!
//! Lets code instrumented with the `tracing` macros share the daemon's log
//! file (or console split) without a second output path:
//!
//! ```ignore
//! use daemonlog_core::LoggerLayer;
//! use tracing_subscriber::prelude::*;
//!
//! daemonlog_core::init_logging("csi", &config)?;
//! tracing_subscriber::registry().with(LoggerLayer::process()).init();
//!
//! tracing::info!(volume = "pvc-42", "attached");
//! // 2026-01-21 14:30:45.123456 4242 [INFO]: attached volume=pvc-42
//! ```

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::global;
use crate::logger::Logger;
use crate::severity::Severity;

/// Events from these targets are the facility's own diagnostics and are
/// never fed back into it.
const OWN_TARGET: &str = "daemonlog_core";

/// Where the layer sends events.
enum Target {
    /// Whatever logger is installed process-wide at event time
    Process,
    /// A specific logger
    Fixed(Arc<Logger>),
}

/// A tracing Layer that writes events through a [`Logger`].
pub struct LoggerLayer {
    target: Target,
}

impl LoggerLayer {
    /// Layer that forwards to the process-wide logger.
    ///
    /// Events arriving before [`init_logging`](crate::init_logging) are
    /// dropped.
    pub fn process() -> Self {
        Self {
            target: Target::Process,
        }
    }

    /// Layer that forwards to `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            target: Target::Fixed(logger),
        }
    }

    fn logger(&self) -> Option<Arc<Logger>> {
        match &self.target {
            Target::Process => global::try_logger().ok(),
            Target::Fixed(logger) => Some(Arc::clone(logger)),
        }
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET) {
            return;
        }

        let severity = Severity::from(*metadata.level());
        let Some(logger) = self.logger() else {
            return;
        };
        // Filter before visiting fields so disabled levels cost nothing.
        // Trace has no rendering and is dropped here rather than reported.
        if !logger.is_enabled(severity) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        logger.log(severity, &visitor.finish());
    }
}

/// Visitor that renders an event as `message key=value ...`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: &dyn std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), &format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), &value);
        }
    }
}
