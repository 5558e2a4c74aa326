use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Bot API root, overridable for self-hosted Bot API servers and tests.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Long-poll wait passed to `getUpdates` as `timeout`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Pause after a failed poll before the next attempt.
    #[serde(default = "default_error_delay")]
    pub error_delay_secs: u64,
    /// Upper bound on a single `sendMessage` or `setMyCommands` request.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout(),
            error_delay_secs: default_error_delay(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

impl TelegramConfig {
    /// Fill an empty `bot_token` from `TELEGRAM_BOT_TOKEN`.
    pub fn apply_env(&mut self) {
        if self.bot_token.is_empty() {
            if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
                self.bot_token = token;
            }
        }
    }
}
