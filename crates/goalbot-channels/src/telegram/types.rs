//! Telegram Bot API deserialization types.
//!
//! Only the fields the bot relies on are declared; unknown fields are ignored,
//! missing required ones fail decoding.

use goalbot_core::message::{InboundMessage, Update};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    /// Absent for edited messages, channel posts, callback queries, etc.
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

impl From<TgUpdate> for Update {
    fn from(update: TgUpdate) -> Self {
        Self {
            update_id: update.update_id,
            message: update.message.map(|m| InboundMessage {
                chat_id: m.chat.id,
                text: m.text,
            }),
        }
    }
}
