use std::sync::Arc;

use teloxide::Bot;

use tlf_core::{
    config::Config,
    sink::{LogSink, TelegramForwarder},
};
use tlf_telegram::TelegramSender;

/// Wires the forwarder and pushes two probe events through the pipeline:
/// an INFO line the default level set filters out, and an ERROR line that
/// should land in the configured error group.
#[tokio::main]
async fn main() -> Result<(), tlf_core::Error> {
    let cfg = Config::load()?;

    let forwarder = if cfg.forwarding.enabled {
        let sender = Arc::new(TelegramSender::new(
            Bot::new(cfg.telegram_bot_token.clone()),
            cfg.error_group,
            cfg.send_timeout,
        ));
        Some(TelegramForwarder::start(
            cfg.forwarding.clone(),
            sender,
            cfg.queue_capacity,
        ))
    } else {
        None
    };

    tlf_tracing::init(
        "tlf",
        forwarder.clone().map(|f| f as Arc<dyn LogSink>),
    )?;

    tracing::info!(target: "probe", "telegram log forwarder probe starting");
    tracing::error!(target: "probe", "probe error event");

    match forwarder {
        Some(forwarder) => {
            forwarder.shutdown().await;
            println!("probe drained; check the error group for the ERROR event");
        }
        None => println!("forwarding disabled; set TELEGRAM_LOGGING_ENABLED=true to probe"),
    }

    Ok(())
}
