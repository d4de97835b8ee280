//! Telegram adapter (teloxide).
//!
//! Delivers `/status` commands to the `sbot-core` dispatcher and carries the
//! text replies back to the chat.

use teloxide::prelude::*;

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use sbot_core::{errors::Error, Result};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    /// Send a plain-text reply. Status texts carry no markup, so no parse mode is set.
    pub async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.with_retry(|| self.bot.send_message(chat_id, text.to_string()))
            .await?;
        Ok(())
    }
}
