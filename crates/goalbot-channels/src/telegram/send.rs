//! Message sending and command registration.

use super::polling::decode_response;
use super::types::TgMessage;
use super::{TelegramClient, MAX_MESSAGE_LEN};
use crate::utils::split_message;
use goalbot_core::{error::GoalbotError, message::SentMessage};
use tracing::{info, warn};

impl TelegramClient {
    /// Send a text message to a chat, splitting at Telegram's length limit.
    ///
    /// Returns the gateway's echo of everything that was delivered.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> Result<SentMessage, GoalbotError> {
        let mut delivered = SentMessage {
            chat_id,
            text: String::new(),
        };

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let url = format!("{}/sendMessage", self.base_url);
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .timeout(self.send_timeout)
                .send()
                .await
                .map_err(|e| GoalbotError::Transport(format!("telegram send failed: {e}")))?;

            let echoed: TgMessage = decode_response(resp, "sendMessage").await?;
            delivered.chat_id = echoed.chat.id;
            delivered.text.push_str(echoed.text.as_deref().unwrap_or_default());
        }

        Ok(delivered)
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "goals", "description": "List your active goals" },
                { "command": "create", "description": "Create a goal in one of your categories" },
                { "command": "cancel", "description": "Abandon the current dialog" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        let request = self
            .client
            .post(&url)
            .json(&commands)
            .timeout(self.send_timeout);
        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }
}
