use crate::record::LogRecord;
use crate::sender::LogSender;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that observes events and forwards them to
/// a [`LogSender`] as individual datagrams.
///
/// Deliberately thin: no channel, no batching, no background task. Each
/// event is normalized and handed to the sender on the calling thread;
/// a send failure increments the dropped counter and writes one line to
/// stderr. Never logs through `tracing` itself on this path.
pub struct ShipperLayer {
    sender: Arc<LogSender>,
    min_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Accepted by the sender (sent or buffered for the drain).
    pub shipped_events: Arc<AtomicU64>,
    /// Lost to a send failure.
    pub dropped_events: Arc<AtomicU64>,
}

impl ShipperLayer {
    /// Create a layer forwarding events at `min_level` and above to the
    /// provided sender.
    pub fn new(sender: Arc<LogSender>, min_level: Level) -> Self {
        Self {
            sender,
            min_level,
            total_events: Arc::new(AtomicU64::new(0)),
            shipped_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Final path component of a source file path, platform-aware.
fn base_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Map a tracing level onto the collector's level name and number.
fn collector_level(level: &Level) -> (i64, &'static str) {
    match *level {
        Level::ERROR => (40, "ERROR"),
        Level::WARN => (30, "WARNING"),
        Level::INFO => (20, "INFO"),
        Level::DEBUG => (10, "DEBUG"),
        Level::TRACE => (5, "TRACE"),
    }
}

impl<S> Layer<S> for ShipperLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.min_level {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        // Event message plus `key=value` pairs for the remaining fields.
        let mut msg = message.unwrap_or_default();
        for (key, value) in &fields {
            if !msg.is_empty() {
                msg.push(' ');
            }
            let _ = write!(msg, "{}={}", key, value);
        }

        let meta = event.metadata();
        let (levelno, levelname) = collector_level(meta.level());
        let mut record = LogRecord::new(meta.target(), levelname, levelno, msg);
        record.pathname = meta.file().map(str::to_string);
        record.filename = meta.file().map(base_name);
        record.module = meta.module_path().map(str::to_string);
        record.lineno = meta.line();

        // Enclosing span names, root first. The innermost one stands in
        // for the function name (with `#[instrument]` it is one).
        if let Some(scope) = ctx.event_scope(event) {
            let chain: Vec<String> = scope
                .from_root()
                .map(|span| span.name().to_string())
                .collect();
            record.func_name = chain.last().cloned();
            if !chain.is_empty() {
                record.chain = Some(chain);
            }
        }

        match self.sender.emit(&record) {
            Ok(()) => {
                self.shipped_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("log shipper send failed, dropping record: {}", err);
            }
        }
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_leading_directories() {
        assert_eq!(base_name("src/layer.rs"), "layer.rs");
        assert_eq!(base_name("/abs/path/mod.rs"), "mod.rs");
        assert_eq!(base_name("lib.rs"), "lib.rs");
    }
}
