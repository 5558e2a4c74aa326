//! Records shared between the bot and the goal tracker.

use crate::message::ChatId;
use serde::{Deserialize, Serialize};

/// Primary key of a goal-tracker user account.
pub type AccountId = i64;

/// Length of generated verification codes.
pub const VERIFICATION_CODE_LEN: usize = 25;

/// Link between a messaging chat and a goal-tracker account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatIdentity {
    pub chat_id: ChatId,
    pub account: Option<AccountId>,
    /// Kept after linking; see `ChatIdentityStore::link_account`.
    pub verification_code: Option<String>,
}

impl ChatIdentity {
    /// A chat is verified exactly when an account is attached.
    pub fn is_verified(&self) -> bool {
        self.account.is_some()
    }
}

/// Goal category owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub owner: AccountId,
    pub board_id: i64,
}

/// Goal status codes as stored by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum GoalStatus {
    ToDo = 1,
    InProgress = 2,
    Done = 3,
    Archived = 4,
}

impl GoalStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::ToDo),
            2 => Some(Self::InProgress),
            3 => Some(Self::Done),
            4 => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

/// A goal as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub owner: AccountId,
    pub status: GoalStatus,
}
