use crate::config::{Credentials, TELEGRAM_CHAT_ID_ENV, TELEGRAM_TOKEN_ENV, WatchConfig};
use crate::error::{Result, WatchError};
use crate::notify::gate::failure_message;
use crate::notify::traits::Notifier;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::error;

/// Telegram Bot API adapter (`sendMessage` only).
#[derive(Clone)]
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Build an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Config`] if the HTTP client cannot be built.
    pub fn new(api_base: &str, bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_owned(),
            bot_token: bot_token.to_owned(),
            chat_id: chat_id.to_owned(),
            client,
        })
    }

    /// # Errors
    ///
    /// Returns [`WatchError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &WatchConfig, credentials: &Credentials) -> Result<Self> {
        Self::new(
            &config.telegram_api_base,
            &credentials.telegram_token,
            &credentials.telegram_chat_id,
            config.request_timeout(),
        )
    }
}

/// Best-effort chat message about a startup failure.
///
/// Looks up the bot token and chat id through `lookup` (the same contract as
/// [`Credentials::from_lookup`]) and sends one message when both are present.
/// Returns `true` when a send was attempted.
pub async fn report_startup_failure<F>(
    config: &WatchConfig,
    lookup: F,
    failure: &WatchError,
) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let token = lookup(TELEGRAM_TOKEN_ENV).filter(|v| !v.trim().is_empty());
    let chat_id = lookup(TELEGRAM_CHAT_ID_ENV).filter(|v| !v.trim().is_empty());
    let (Some(token), Some(chat_id)) = (token, chat_id) else {
        return false;
    };

    let notifier = match TelegramNotifier::new(
        &config.telegram_api_base,
        &token,
        &chat_id,
        config.request_timeout(),
    ) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(error = %e, "cannot report startup failure");
            return false;
        }
    };
    if let Err(e) = notifier.send(&failure_message(failure)).await {
        error!(error = %e, "cannot report startup failure");
    }
    true
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn id(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(WatchError::Delivery("telegram bot token is empty".to_owned()));
        }
        if self.chat_id.trim().is_empty() {
            return Err(WatchError::Delivery("telegram chat_id is empty".to_owned()));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WatchError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await.unwrap_or_default();
        let ok = payload
            .get("ok")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !status.is_success() || !ok {
            let description = payload
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            return Err(WatchError::Delivery(format!(
                "telegram send failed ({status}): {description}"
            )));
        }
        Ok(())
    }
}
