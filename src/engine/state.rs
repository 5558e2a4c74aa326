//! Per-chat conversation state for multi-step flows.

use goalbot_core::{message::ChatId, model::Category};
use std::collections::HashMap;

/// Where a chat stands in the goal-creation flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChatState {
    /// No flow in progress; messages are read as top-level commands.
    #[default]
    Idle,
    /// `/create` listed the categories; the next text is a category id.
    AwaitingCategory,
    /// Category chosen; the next text is the goal title.
    AwaitingTitle { category: Category },
}

impl ChatState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Keyed store of in-progress flows.
///
/// Single writer: only the dispatch loop (through the engine) mutates it.
/// An entry exists exactly while a chat is mid-flow, so storing
/// [`ChatState::Idle`] removes the entry.
pub trait ConversationStore: Send {
    /// Current state; `Idle` when nothing is stored.
    fn get(&self, chat_id: ChatId) -> ChatState;

    /// Replace the chat's state.
    fn set(&mut self, chat_id: ChatId, state: ChatState);

    /// Drop any in-progress flow, returning what was abandoned.
    fn clear(&mut self, chat_id: ChatId) -> Option<ChatState>;

    /// Number of chats currently mid-flow.
    fn active_flows(&self) -> usize;
}

/// Process-local store; flows are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryConversations {
    flows: HashMap<ChatId, ChatState>,
}

impl InMemoryConversations {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryConversations {
    fn get(&self, chat_id: ChatId) -> ChatState {
        self.flows.get(&chat_id).cloned().unwrap_or_default()
    }

    fn set(&mut self, chat_id: ChatId, state: ChatState) {
        if state.is_idle() {
            self.flows.remove(&chat_id);
        } else {
            self.flows.insert(chat_id, state);
        }
    }

    fn clear(&mut self, chat_id: ChatId) -> Option<ChatState> {
        self.flows.remove(&chat_id)
    }

    fn active_flows(&self) -> usize {
        self.flows.len()
    }
}
