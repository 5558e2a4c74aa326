//! Top-level bot commands for verified chats.

mod goals;


use crate::engine::{replies, ChatState};
use goalbot_core::{model::AccountId, traits::DomainGateway};

/// Every message starting with this prefix is a command, never flow input.
pub const COMMAND_PREFIX: char = '/';

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub domain: &'a dyn DomainGateway,
    pub account: AccountId,
}

/// Reply text plus the state the chat moves to.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub reply: String,
    pub next: ChatState,
}

impl CommandOutcome {
    fn idle(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            next: ChatState::Idle,
        }
    }
}

/// Known bot commands.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Goals,
    Create,
    Cancel,
    /// Prefixed text that matches no command.
    Unknown,
}

impl Command {
    /// Parse a command from message text. Returns `None` when the text does
    /// not start with the command prefix.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        if !text.starts_with(COMMAND_PREFIX) {
            return None;
        }
        let first = text.split_whitespace().next().unwrap_or(text);
        // Strip @botname suffix (e.g. "/goals@goal_bot" → "/goals").
        let cmd = first.split('@').next().unwrap_or(first);
        Some(match cmd {
            "/goals" => Self::Goals,
            "/create" => Self::Create,
            "/cancel" => Self::Cancel,
            _ => Self::Unknown,
        })
    }
}

/// Handle a command and return the reply with the chat's next state.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> CommandOutcome {
    match cmd {
        Command::Goals => goals::handle_goals(ctx).await,
        Command::Create => goals::handle_create(ctx).await,
        Command::Cancel => CommandOutcome::idle(replies::chat_closed()),
        Command::Unknown => CommandOutcome::idle(replies::command_not_found()),
    }
}
