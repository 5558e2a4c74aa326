use serde::{Deserialize, Serialize};

/// External chat identifier assigned by the messaging platform.
pub type ChatId = i64;

/// A message received from a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    /// Text body. Absent for stickers, photos, and other non-text messages.
    #[serde(default)]
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
        }
    }

    /// Text body with surrounding whitespace removed, or `""` when absent.
    pub fn body(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }
}

/// One entry of a long-poll batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    /// `None` for update kinds the bot does not handle (edits, channel posts).
    pub message: Option<InboundMessage>,
}

/// A reply to send back to a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub chat_id: ChatId,
    pub text: String,
}

impl OutboundReply {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// Gateway confirmation for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
}
