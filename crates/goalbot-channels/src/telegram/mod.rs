//! Telegram Bot API client.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for replies.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
pub(crate) mod types;


use goalbot_core::config::TelegramConfig;
use std::time::Duration;

/// Telegram's per-message text limit.
pub(crate) const MAX_MESSAGE_LEN: usize = 4096;

/// Slack on top of the long-poll wait before the HTTP request itself times out.
const REQUEST_TIMEOUT_SLACK_SECS: u64 = 5;

/// Telegram gateway client using the Bot API with long polling.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    /// Bound on non-polling requests; the dispatch loop waits on every send.
    send_timeout: Duration,
}

impl TelegramClient {
    /// Create a new client from config.
    pub fn new(config: &TelegramConfig) -> Self {
        let base_url = format!(
            "{}/bot{}",
            config.api_base_url.trim_end_matches('/'),
            config.bot_token
        );
        Self {
            client: reqwest::Client::new(),
            base_url,
            send_timeout: Duration::from_secs(config.send_timeout_secs),
        }
    }
}
