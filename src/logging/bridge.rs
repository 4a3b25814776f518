// Routes `tracing` events into a Log
//
// Lets code that already logs through the tracing macros (this crate included) land in the
// same file, in the same line format, as direct Log calls.

use super::format::SourceLocation;
use super::{Log, Severity};
use crate::error::{ClautoError, Result};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// `tracing_subscriber` layer writing every event through a [`Log`]
///
/// Levels map TRACE→VRB, DEBUG→DBG, INFO→INF, WARN→WRN, ERROR→ERR. The event's own
/// file/line metadata is used as the source location.
#[derive(Debug, Clone)]
pub struct LogLayer {
    log: Log,
}

impl LogLayer {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = Severity::from(*metadata.level());
        if !self.log.enabled(severity) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let location = SourceLocation {
            file: metadata.file().unwrap_or_else(|| metadata.target()),
            line: metadata.line().unwrap_or(0),
        };
        self.log.emit(
            severity,
            format_args!("{}{}", visitor.message, visitor.fields),
            location,
        );
    }
}

/// Install a global `tracing` subscriber that writes through `log`.
///
/// `filter` uses `EnvFilter` directive syntax, e.g. `"info"` or `"clauto_common=debug"`.
/// The Log's own threshold still applies after the filter.
///
/// # Errors
/// [`ClautoError::SubscriberInit`] if the filter is malformed or a global subscriber is
/// already set.
pub fn install_tracing_bridge(log: &Log, filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_new(filter).map_err(|e| ClautoError::SubscriberInit(e.to_string()))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(LogLayer::new(log.clone()))
        .try_init()
        .map_err(|e| ClautoError::SubscriberInit(e.to_string()))?;

    tracing::debug!("Tracing bridge installed with filter <{}>", filter);
    Ok(())
}
