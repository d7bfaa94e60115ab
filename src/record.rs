use chrono::Utc;
use std::sync::OnceLock;
use std::time::Instant;

/// Exception information attached to a log record.
///
/// Rendered to a single `exc_text` string during normalization; the raw
/// value never reaches the wire.
#[derive(Debug, Clone)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
}

impl ExceptionInfo {
    pub fn render(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }
}

/// A single structured log event as produced by the logging front end.
///
/// The field set is fixed and doubles as the wire allow-list: everything
/// here (minus the transformations applied by [`crate::payload::normalize`])
/// ends up in the serialized payload. Immutable once produced.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Logger/target name.
    pub name: String,
    /// Pre-rendered message; positional args are already interpolated.
    pub msg: String,
    pub args: Vec<serde_json::Value>,
    pub levelname: String,
    pub levelno: i64,
    pub pathname: Option<String>,
    pub filename: Option<String>,
    pub module: Option<String>,
    pub lineno: Option<u32>,
    pub func_name: Option<String>,
    /// Seconds since the Unix epoch, fractional.
    pub created: f64,
    /// Millisecond fraction of `created`.
    pub msecs: f64,
    /// Milliseconds since the emitting process started.
    pub relative_created: f64,
    pub thread: Option<u64>,
    pub thread_name: Option<String>,
    pub process_name: Option<String>,
    pub process: Option<u32>,
    pub exc_info: Option<ExceptionInfo>,
    pub stack_info: Option<String>,
    /// Nested execution-context labels, root first. Prepended to the
    /// message as `[a:b:c] ` during normalization when non-empty.
    pub chain: Option<Vec<String>>,
}

impl LogRecord {
    /// Create a record with timestamps and thread/process identity
    /// filled in; location, chain and exception fields start empty.
    pub fn new(
        name: impl Into<String>,
        levelname: impl Into<String>,
        levelno: i64,
        msg: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            msg: msg.into(),
            args: Vec::new(),
            levelname: levelname.into(),
            levelno,
            pathname: None,
            filename: None,
            module: None,
            lineno: None,
            func_name: None,
            created: now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9,
            msecs: f64::from(now.timestamp_subsec_micros()) / 1000.0,
            relative_created: millis_since_start(),
            thread: None,
            thread_name: std::thread::current().name().map(str::to_string),
            process_name: None,
            process: Some(std::process::id()),
            exc_info: None,
            stack_info: None,
            chain: None,
        }
    }
}

/// Milliseconds elapsed since this clock was first consulted. Pinned on
/// first use, so the earliest record in a process reads close to zero.
pub fn millis_since_start() -> f64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
