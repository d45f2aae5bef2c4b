//! tracing adapter: bridges `tracing` events into the core log sink.
//!
//! `TelegramLayer` is attached to the subscriber at startup (the Rust
//! equivalent of registering an appender on the root logger) and hands
//! every passing event to a `LogSink`.

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use tracing::{
    field::{Field, Visit},
    Event, Level as TracingLevel, Subscriber,
};
use tracing_subscriber::{layer::Context, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use tlf_core::{
    domain::{ErrorChain, Level, LogEvent},
    sink::LogSink,
    Result,
};

/// Targets never forwarded, so the pipeline cannot feed on its own logs
/// (or on its HTTP transport's).
const SUPPRESSED_TARGETS: &[&str] = &[
    "tlf_core",
    "tlf_telegram",
    "tlf_tracing",
    "teloxide",
    "hyper",
    "reqwest",
];

pub struct TelegramLayer {
    sink: Arc<dyn LogSink>,
    capture_backtrace: bool,
}

impl TelegramLayer {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            capture_backtrace: true,
        }
    }

    /// Toggle backtrace capture for ERROR events.
    pub fn with_backtrace(mut self, capture: bool) -> Self {
        self.capture_backtrace = capture;
        self
    }

    fn suppressed(target: &str) -> bool {
        SUPPRESSED_TARGETS.iter().any(|t| target.starts_with(t))
    }
}

impl<S: Subscriber> Layer<S> for TelegramLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if Self::suppressed(meta.target()) {
            return;
        }

        let level = map_level(meta.level());

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        // tracing events carry no exception object; for errors the chain
        // is a captured backtrace, one source location per frame.
        let error = if self.capture_backtrace && level == Level::Error {
            Some(capture_error_chain())
        } else {
            None
        };

        self.sink.handle(&LogEvent {
            level,
            logger: meta.target().to_string(),
            message: visitor.message,
            timestamp_millis: Utc::now().timestamp_millis(),
            error,
        });
    }
}

/// Initialize logging: console fmt layer plus, when a sink is given, the
/// Telegram forwarding layer.
///
/// Default: info for our crates. Can be overridden with `RUST_LOG`.
pub fn init(service_name: &str, sink: Option<Arc<dyn LogSink>>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,tlf_core=info,{service_name}=info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(true),
        )
        .with(sink.map(TelegramLayer::new))
        .try_init()
        .map_err(|e| tlf_core::Error::Config(format!("logging init failed: {e}")))?;

    Ok(())
}

fn map_level(level: &TracingLevel) -> Level {
    if *level == TracingLevel::ERROR {
        Level::Error
    } else if *level == TracingLevel::WARN {
        Level::Warn
    } else if *level == TracingLevel::INFO {
        Level::Info
    } else if *level == TracingLevel::DEBUG {
        Level::Debug
    } else {
        Level::Trace
    }
}

/// Collects the `message` field; other fields stay on the console layer.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        }
    }
}

fn capture_error_chain() -> ErrorChain {
    let rendered = Backtrace::force_capture().to_string();
    ErrorChain {
        frames: rendered
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<LogEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<LogEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingSink {
        fn handle(&self, event: &LogEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn with_layer(layer: TelegramLayer, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn forwards_level_target_and_rendered_message() {
        let sink = Arc::new(RecordingSink::default());
        let layer = TelegramLayer::new(sink.clone()).with_backtrace(false);

        with_layer(layer, || {
            tracing::error!(target: "app::payment", "charge failed: {}", 42);
        });

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::Error);
        assert_eq!(events[0].logger, "app::payment");
        assert_eq!(events[0].message, "charge failed: 42");
        assert!(events[0].error.is_none());
        assert!(events[0].timestamp_millis > 0);
    }

    #[test]
    fn maps_non_error_levels() {
        let sink = Arc::new(RecordingSink::default());
        let layer = TelegramLayer::new(sink.clone()).with_backtrace(false);

        with_layer(layer, || {
            tracing::warn!(target: "app", "w");
            tracing::info!(target: "app", "i");
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Level::Warn);
        assert_eq!(events[1].level, Level::Info);
        // No backtrace attached below ERROR regardless of the toggle.
        assert!(events.iter().all(|e| e.error.is_none()));
    }

    #[test]
    fn skips_pipeline_and_transport_targets() {
        let sink = Arc::new(RecordingSink::default());
        let layer = TelegramLayer::new(sink.clone()).with_backtrace(false);

        with_layer(layer, || {
            tracing::error!(target: "teloxide::requests", "429");
            tracing::error!(target: "tlf_core::sink", "log delivery failed");
            tracing::error!(target: "hyper::client", "connection reset");
        });

        assert!(sink.events().is_empty());
    }

    #[test]
    fn captures_backtrace_frames_for_errors() {
        let sink = Arc::new(RecordingSink::default());
        let layer = TelegramLayer::new(sink.clone());

        with_layer(layer, || {
            tracing::error!(target: "app", "boom");
        });

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let chain = events[0].error.as_ref().expect("error chain captured");
        assert!(!chain.frames.is_empty());
    }
}
