//! Goal command handlers: /goals, /create.

use super::{CommandContext, CommandOutcome};
use crate::engine::{replies, ChatState};
use tracing::error;

pub(super) async fn handle_goals(ctx: &CommandContext<'_>) -> CommandOutcome {
    match ctx.domain.list_active_goals(ctx.account).await {
        Ok(goals) if goals.is_empty() => CommandOutcome::idle(replies::NO_GOALS),
        Ok(goals) => CommandOutcome::idle(replies::listing(
            "Your goals:",
            goals.iter().map(|g| (g.id, g.title.as_str())),
        )),
        Err(e) => {
            error!("listing goals for account {} failed: {e}", ctx.account);
            CommandOutcome::idle(replies::TRY_AGAIN)
        }
    }
}

/// Start the creation flow: list categories and wait for a choice.
pub(super) async fn handle_create(ctx: &CommandContext<'_>) -> CommandOutcome {
    match ctx.domain.list_active_categories(ctx.account).await {
        Ok(categories) if categories.is_empty() => CommandOutcome::idle(replies::NO_CATEGORIES),
        Ok(categories) => CommandOutcome {
            reply: replies::listing(
                "Select category to create goal:",
                categories.iter().map(|c| (c.id, c.title.as_str())),
            ),
            next: ChatState::AwaitingCategory,
        },
        Err(e) => {
            error!("listing categories for account {} failed: {e}", ctx.account);
            CommandOutcome::idle(replies::TRY_AGAIN)
        }
    }
}
