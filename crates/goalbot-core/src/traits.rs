use crate::{
    error::GoalbotError,
    message::{ChatId, SentMessage, Update},
    model::{AccountId, Category, ChatIdentity, Goal},
};
use async_trait::async_trait;
use std::time::Duration;

/// Messaging gateway client: the bot's only link to its chats.
///
/// Implemented by the Telegram long-poll client; tests substitute a
/// recording fake.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Human-readable gateway name.
    fn name(&self) -> &str;

    /// Long-poll for updates with `update_id >= offset`.
    ///
    /// Blocks up to `wait` and returns an empty batch on timeout. Updates are
    /// returned in ascending `update_id` order.
    async fn fetch_updates(&self, offset: i64, wait: Duration)
        -> Result<Vec<Update>, GoalbotError>;

    /// Send a plain-text reply to a chat.
    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, GoalbotError>;
}

/// Persistent mapping from chat id to account link and verification code.
///
/// Shared between the dispatch loop and the verification endpoint.
#[async_trait]
pub trait ChatIdentityStore: Send + Sync {
    /// Fetch the identity for `chat_id`, creating an unverified one on first sight.
    async fn get_or_create(&self, chat_id: ChatId) -> Result<ChatIdentity, GoalbotError>;

    /// Generate and persist a fresh verification code, replacing any prior one.
    async fn issue_verification_code(&self, chat_id: ChatId) -> Result<String, GoalbotError>;

    /// Attach `account` to the identity holding `code`.
    ///
    /// Must be atomic: of two concurrent calls with the same code, at most one
    /// succeeds. Fails with `NotFound` when no unlinked identity holds the code.
    /// The code value itself is left in place.
    async fn link_account(
        &self,
        code: &str,
        account: AccountId,
    ) -> Result<ChatIdentity, GoalbotError>;
}

/// Query/command interface onto the goal tracker.
#[async_trait]
pub trait DomainGateway: Send + Sync {
    /// Goals owned by `account`, excluding archived ones.
    async fn list_active_goals(&self, account: AccountId) -> Result<Vec<Goal>, GoalbotError>;

    /// Non-deleted categories owned by `account`.
    async fn list_active_categories(
        &self,
        account: AccountId,
    ) -> Result<Vec<Category>, GoalbotError>;

    /// Look up a non-deleted category. Fails with `DomainLookup` when absent.
    async fn get_category(&self, id: i64) -> Result<Category, GoalbotError>;

    /// Create a goal with default status and priority.
    async fn create_goal(
        &self,
        category: &Category,
        account: AccountId,
        title: &str,
    ) -> Result<Goal, GoalbotError>;
}
