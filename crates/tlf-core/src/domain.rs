use std::fmt;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Severity of a log event.
///
/// `as_str` returns the canonical upper-case label. Level filtering works
/// on these labels, not on ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stack frames captured with an error, in original order (innermost
/// first). Each frame is a pre-rendered source-location string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorChain {
    pub frames: Vec<String>,
}

/// One log event as handed to the sink by a logging-framework adapter.
#[derive(Clone, Debug)]
pub struct LogEvent {
    pub level: Level,
    /// Logger/source name (the tracing target).
    pub logger: String,
    /// Fully rendered message text.
    pub message: String,
    /// Event time as epoch milliseconds (UTC).
    pub timestamp_millis: i64,
    pub error: Option<ErrorChain>,
}
