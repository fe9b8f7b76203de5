//! Minimal Telegram Bot API client for channel posts.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram's limit for `sendMessage` text.
const MAX_TEXT_LEN: usize = 4096;

/// Telegram's limit for `sendPhoto` captions.
const MAX_CAPTION_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram {method} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        method: &'static str,
        status: u16,
        body: String,
    },
}

/// How a post actually reached the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Text,
    Photo,
    /// `sendPhoto` was rejected and the caption went out as text instead.
    TextFallback,
}

pub struct TelegramClient {
    client: Client,
    token: String,
    channel_id: String,
    api_base: String,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns [`TelegramError::Config`] if the token or channel is empty, or
    /// [`TelegramError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(token: &str, channel_id: &str, timeout_secs: u64) -> Result<Self, TelegramError> {
        Self::with_api_base(token, channel_id, timeout_secs, DEFAULT_API_BASE)
    }

    /// Creates a client against a custom API base (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`TelegramClient::new`].
    pub fn with_api_base(
        token: &str,
        channel_id: &str,
        timeout_secs: u64,
        api_base: &str,
    ) -> Result<Self, TelegramError> {
        if token.trim().is_empty() {
            return Err(TelegramError::Config("TELEGRAM_BOT_TOKEN is not set".into()));
        }
        if channel_id.trim().is_empty() {
            return Err(TelegramError::Config("TELEGRAM_CHANNEL_ID is not set".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            channel_id: channel_id.to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
        })
    }

    /// Posts a text message to the channel.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] on network failure or a non-2xx status.
    pub async fn send_text(&self, text: &str) -> Result<Value, TelegramError> {
        let payload = json!({
            "chat_id": self.channel_id,
            "text": clean_caption(text, MAX_TEXT_LEN),
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });
        self.call("sendMessage", &payload).await
    }

    /// Posts a photo with a caption, falling back to a text post if Telegram
    /// rejects the photo.
    ///
    /// # Errors
    ///
    /// Returns the `sendPhoto` error when both the photo and the text
    /// fallback fail.
    pub async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<Delivery, TelegramError> {
        let payload = json!({
            "chat_id": self.channel_id,
            "photo": photo_url,
            "caption": clean_caption(caption, MAX_CAPTION_LEN),
            "parse_mode": "HTML",
        });

        let photo_err = match self.call("sendPhoto", &payload).await {
            Ok(_) => return Ok(Delivery::Photo),
            Err(err) => err,
        };

        tracing::warn!(error = %photo_err, photo_url, "sendPhoto failed; falling back to text");
        // `send_text` cleans the combined text itself, so pass the raw caption.
        match self.send_text(&format!("{}\n{photo_url}", caption.trim())).await {
            Ok(_) => Ok(Delivery::TextFallback),
            Err(fallback_err) => {
                tracing::error!(error = %fallback_err, "text fallback also failed");
                Err(photo_err)
            }
        }
    }

    async fn call(&self, method: &'static str, payload: &Value) -> Result<Value, TelegramError> {
        let url = format!("{}/bot{}/{method}", self.api_base, self.token);
        // The bot token is part of the path; keep it out of error text.
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(TelegramError::UnexpectedStatus {
                method,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(method, status = status.as_u16(), "telegram call succeeded");
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

/// Trims, truncates to `max_len` characters (ending in `...`), and escapes
/// `&`, `<` and `>` for HTML parse mode. Telegram measures length after
/// entity parsing, so escaping happens after truncation.
fn clean_caption(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    let truncated = if trimmed.chars().count() > max_len {
        let mut cut: String = trimmed.chars().take(max_len.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        trimmed.to_owned()
    };
    truncated
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
