//! The forwarding sink: filter → format → bounded handoff → delivery.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ForwardingConfig;
use crate::domain::LogEvent;
use crate::formatting::build_message;
use crate::Result;

/// Outbound port: deliver one formatted message to the error group.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<()>;
}

/// Inbound port: one entry point per emitted log event.
///
/// `handle` runs synchronously on whatever thread logs and must never
/// panic, block, or surface an error to the logging pipeline.
pub trait LogSink: Send + Sync {
    fn handle(&self, event: &LogEvent);
}

/// Forwards passing events to Telegram.
///
/// Filtering and formatting happen on the calling thread with no shared
/// mutable per-call state; the network call happens on a single worker
/// task that owns the `Sender` and drains a bounded queue in order. A
/// full queue drops the event (forwarding is best-effort).
pub struct TelegramForwarder {
    config: ForwardingConfig,
    tx: mpsc::Sender<String>,
    started: AtomicBool,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramForwarder {
    /// Spawn the delivery worker and return the started forwarder.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: ForwardingConfig,
        sender: Arc<dyn Sender>,
        queue_capacity: usize,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_worker(rx, sender, cancel.clone()));

        Arc::new(Self {
            config,
            tx,
            started: AtomicBool::new(true),
            cancel,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stop accepting events, drain what is already queued, and join the
    /// worker. Events handled after this returns (or while it runs) are
    /// dropped.
    pub async fn shutdown(&self) {
        self.started.store(false, Ordering::SeqCst);
        self.cancel.cancel();

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl LogSink for TelegramForwarder {
    fn handle(&self, event: &LogEvent) {
        if !self.started.load(Ordering::SeqCst) {
            return;
        }
        if !self.config.enabled {
            return;
        }
        if !self.config.level_allowed(event.level.as_str()) {
            return;
        }

        let message = build_message(event, &self.config);
        // Non-blocking: a full or closed queue drops the event.
        let _ = self.tx.try_send(message);
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<String>,
    sender: Arc<dyn Sender>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(text) => deliver(sender.as_ref(), &text).await,
                None => return,
            },
        }
    }

    // Drain whatever was queued before cancellation.
    while let Ok(text) = rx.try_recv() {
        deliver(sender.as_ref(), &text).await;
    }
}

async fn deliver(sender: &dyn Sender, text: &str) {
    if let Err(e) = sender.deliver(text).await {
        // Suppressed target: never forwarded back through the pipeline.
        tracing::debug!(target: "tlf_core::sink", error = %e, "log delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Level;
    use crate::Error;
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingSender {
        sent: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sender for RecordingSender {
        async fn deliver(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl Sender for FailingSender {
        async fn deliver(&self, _text: &str) -> Result<()> {
            Err(Error::External("telegram error: 400".to_string()))
        }
    }

    fn cfg(enabled: bool, levels: &[&str]) -> ForwardingConfig {
        ForwardingConfig {
            enabled,
            allowed_levels: levels.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
            include_stack_trace: true,
            max_stack_trace_lines: 10,
        }
    }

    fn event(level: Level, message: &str) -> LogEvent {
        LogEvent {
            level,
            logger: "app".to_string(),
            message: message.to_string(),
            timestamp_millis: 1_700_000_000_000,
            error: None,
        }
    }

    #[tokio::test]
    async fn disallowed_level_never_reaches_sender() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), sender.clone(), 8);

        forwarder.handle(&event(Level::Info, "ignored"));
        forwarder.handle(&event(Level::Warn, "ignored too"));
        forwarder.shutdown().await;

        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn disabled_forwarding_drops_all_levels() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(false, &["ERROR"]), sender.clone(), 8);

        forwarder.handle(&event(Level::Error, "boom"));
        forwarder.shutdown().await;

        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn passing_event_is_delivered_formatted() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), sender.clone(), 8);

        forwarder.handle(&event(Level::Error, "<a>&b"));
        forwarder.shutdown().await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("<b>ERROR</b>"));
        assert!(sent[0].contains("<pre>&lt;a&gt;&amp;b</pre>"));
    }

    #[tokio::test]
    async fn same_event_twice_yields_identical_payloads() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), sender.clone(), 8);

        let ev = event(Level::Error, "boom");
        forwarder.handle(&ev);
        forwarder.handle(&ev);
        forwarder.shutdown().await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_events_deliver_once_each_without_mixing() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), sender.clone(), 64);

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let forwarder = forwarder.clone();
                std::thread::spawn(move || {
                    forwarder.handle(&event(Level::Error, &format!("event-{i}")));
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        forwarder.shutdown().await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 8);
        for i in 0..8 {
            let needle = format!("<pre>event-{i}</pre>");
            assert_eq!(sent.iter().filter(|m| m.contains(&needle)).count(), 1);
        }
    }

    #[tokio::test]
    async fn events_after_shutdown_are_dropped() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), sender.clone(), 8);

        forwarder.shutdown().await;
        forwarder.handle(&event(Level::Error, "late"));

        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let forwarder = TelegramForwarder::start(cfg(true, &["ERROR"]), Arc::new(FailingSender), 8);

        forwarder.handle(&event(Level::Error, "boom"));
        forwarder.shutdown().await;
    }

    #[tokio::test]
    async fn literal_matching_admits_configured_lowercase_only() {
        let sender = Arc::new(RecordingSender::default());
        let forwarder = TelegramForwarder::start(cfg(true, &["error"]), sender.clone(), 8);

        // Event labels are canonical upper-case; "error" never matches.
        forwarder.handle(&event(Level::Error, "boom"));
        forwarder.shutdown().await;

        assert!(sender.sent().is_empty());
    }
}
