//! Conversation engine. Turns one inbound message into one reply.
//!
//! Unverified chats get a verification code. Verified chats run top-level
//! commands or continue the goal-creation flow tracked in the
//! [`ConversationStore`].
//!
//! Any text starting with the command prefix is a command, even mid-flow, and
//! abandons the flow. A category id or goal title therefore cannot begin with
//! `/`.

pub mod replies;
mod state;


pub use state::{ChatState, ConversationStore, InMemoryConversations};

use crate::commands::{self, Command, CommandContext};
use goalbot_core::{
    error::GoalbotError,
    message::{ChatId, InboundMessage, OutboundReply},
    model::{AccountId, Category, ChatIdentity},
    traits::{ChatIdentityStore, DomainGateway, MessagingClient},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-message state machine over identities, flows, and the goal tracker.
pub struct Engine {
    messenger: Arc<dyn MessagingClient>,
    identities: Arc<dyn ChatIdentityStore>,
    domain: Arc<dyn DomainGateway>,
    conversations: Box<dyn ConversationStore>,
}

impl Engine {
    pub fn new(
        messenger: Arc<dyn MessagingClient>,
        identities: Arc<dyn ChatIdentityStore>,
        domain: Arc<dyn DomainGateway>,
        conversations: Box<dyn ConversationStore>,
    ) -> Self {
        Self {
            messenger,
            identities,
            domain,
            conversations,
        }
    }

    /// Current flow state of a chat.
    pub fn state(&self, chat_id: ChatId) -> ChatState {
        self.conversations.get(chat_id)
    }

    /// Number of chats mid-flow.
    pub fn active_flows(&self) -> usize {
        self.conversations.active_flows()
    }

    /// Process a message and deliver the reply.
    ///
    /// Send failures are logged and swallowed; storage failures are returned
    /// for the caller to log.
    pub async fn handle_message(&mut self, msg: &InboundMessage) -> Result<(), GoalbotError> {
        let reply = self.respond(msg).await?;
        if let Err(e) = self.messenger.send_reply(reply.chat_id, &reply.text).await {
            warn!("reply to chat {} not delivered: {e}", reply.chat_id);
        }
        Ok(())
    }

    /// Advance the chat's state machine and build the reply.
    pub async fn respond(&mut self, msg: &InboundMessage) -> Result<OutboundReply, GoalbotError> {
        let text = self.reply_text(msg).await?;
        Ok(OutboundReply::new(msg.chat_id, text))
    }

    async fn reply_text(&mut self, msg: &InboundMessage) -> Result<String, GoalbotError> {
        let identity = self.identities.get_or_create(msg.chat_id).await?;
        let Some(account) = identity.account else {
            return self.greet_unverified(&identity).await;
        };

        let text = msg.body();
        if let Some(cmd) = Command::parse(text) {
            if let Some(abandoned) = self.conversations.clear(msg.chat_id) {
                debug!("chat {}: {cmd:?} abandons {abandoned:?}", msg.chat_id);
            }
            let ctx = CommandContext {
                domain: self.domain.as_ref(),
                account,
            };
            let outcome = commands::handle(cmd, &ctx).await;
            self.conversations.set(msg.chat_id, outcome.next);
            return Ok(outcome.reply);
        }

        let reply = match self.conversations.get(msg.chat_id) {
            ChatState::Idle => replies::command_not_found(),
            ChatState::AwaitingCategory => self.choose_category(msg.chat_id, account, text).await,
            ChatState::AwaitingTitle { category } => {
                self.create_goal(msg.chat_id, account, &category, text).await
            }
        };
        Ok(reply)
    }

    /// Issue a code on first contact; afterwards repeat the stored one.
    ///
    /// A repeat message never regenerates the code. It still gets a reply,
    /// a reminder carrying the same code, so the chat is not left silent.
    async fn greet_unverified(&self, identity: &ChatIdentity) -> Result<String, GoalbotError> {
        match identity.verification_code.as_deref() {
            Some(code) => Ok(replies::verification_reminder(code)),
            None => {
                let code = self
                    .identities
                    .issue_verification_code(identity.chat_id)
                    .await?;
                info!("issued verification code for chat {}", identity.chat_id);
                Ok(replies::greeting(&code))
            }
        }
    }

    /// AwaitingCategory: resolve the text as one of the account's categories.
    async fn choose_category(&mut self, chat_id: ChatId, account: AccountId, text: &str) -> String {
        let Ok(id) = text.parse::<i64>() else {
            return replies::CATEGORY_NOT_FOUND.to_string();
        };

        match self.domain.get_category(id).await {
            // Someone else's category is reported exactly like a missing one.
            Ok(category) if category.owner == account => {
                self.conversations
                    .set(chat_id, ChatState::AwaitingTitle { category });
                replies::ASK_TITLE.to_string()
            }
            Ok(_) | Err(GoalbotError::DomainLookup(_)) => replies::CATEGORY_NOT_FOUND.to_string(),
            Err(e) => {
                error!("category lookup for chat {chat_id} failed: {e}");
                replies::TRY_AGAIN.to_string()
            }
        }
    }

    /// AwaitingTitle: create the goal and end the flow.
    async fn create_goal(
        &mut self,
        chat_id: ChatId,
        account: AccountId,
        category: &Category,
        title: &str,
    ) -> String {
        if title.is_empty() {
            return replies::EMPTY_TITLE.to_string();
        }
        if title.chars().count() > replies::MAX_TITLE_CHARS {
            return replies::title_too_long();
        }

        self.conversations.clear(chat_id);
        match self.domain.create_goal(category, account, title).await {
            Ok(goal) => {
                info!("chat {chat_id} created goal {} in category {}", goal.id, category.id);
                replies::GOAL_CREATED.to_string()
            }
            Err(e) => {
                error!("goal creation for chat {chat_id} failed: {e}");
                replies::TRY_AGAIN.to_string()
            }
        }
    }
}
