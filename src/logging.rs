use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use tracing::{field::Field, field::Visit, Event, Subscriber};
use tracing_subscriber::{
    layer::Context, prelude::*, registry::LookupSpan, util::TryInitError, EnvFilter, Layer,
};

/// Maximum number of entries kept in memory
pub const LOG_BUFFER_CAPACITY: usize = 1000;

/// Shared ring buffer of recent log entries
pub type LogBuffer = Arc<RwLock<VecDeque<LogEntry>>>;

/// A structured log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// A visitor to extract the message from a log event's fields.
#[derive(Default)]
struct LogVisitor {
    message: Option<String>,
}

impl Visit for LogVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// A tracing layer that keeps recent logs in a ring buffer.
#[derive(Debug, Clone)]
pub struct RecentLogLayer {
    buffer: LogBuffer,
}

impl RecentLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for RecentLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LogVisitor::default();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            let log_entry = LogEntry {
                timestamp: Utc::now(),
                level: event.metadata().level().to_string(),
                target: event.metadata().target().to_string(),
                message,
            };

            if let Ok(mut buffer) = self.buffer.write() {
                buffer.push_back(log_entry);
                if buffer.len() > LOG_BUFFER_CAPACITY {
                    buffer.pop_front();
                }
            }
        }
    }
}

/// Install the global subscriber: `RUST_LOG` when set, otherwise `default_level`.
/// Returns the buffer the recent-log layer writes to.
pub fn init(default_level: &str) -> Result<LogBuffer, TryInitError> {
    let buffer: LogBuffer = Arc::new(RwLock::new(VecDeque::new()));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(RecentLogLayer::new(buffer.clone()))
        .try_init()?;

    Ok(buffer)
}
