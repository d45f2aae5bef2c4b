//! Telegram adapter (teloxide).
//!
//! This crate implements the `tlf-core` `Sender` port over the Telegram
//! Bot API.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

use tlf_core::{domain::ChatId, errors::Error, sink::Sender, Result};

/// Sends formatted messages to the preconfigured error group.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
    error_group: ChatId,
    send_timeout: Duration,
}

impl TelegramSender {
    pub fn new(bot: Bot, error_group: ChatId, send_timeout: Duration) -> Self {
        Self {
            bot,
            error_group,
            send_timeout,
        }
    }

    pub fn from_token(token: &str, error_group: ChatId, send_timeout: Duration) -> Self {
        Self::new(Bot::new(token), error_group, send_timeout)
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl Sender for TelegramSender {
    /// Single attempt; a stalled call is cut off by the configured
    /// timeout.
    async fn deliver(&self, text: &str) -> Result<()> {
        let request = self
            .bot
            .send_message(Self::tg_chat(self.error_group), text.to_string())
            .parse_mode(ParseMode::Html);

        tokio::time::timeout(self.send_timeout, request)
            .await
            .map_err(|_| Error::Timeout(self.send_timeout))?
            .map_err(Self::map_err)?;

        Ok(())
    }
}
