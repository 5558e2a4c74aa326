//! Fakes shared by the binary's test modules.

use async_trait::async_trait;
use goalbot_core::{
    config::MemoryConfig,
    error::GoalbotError,
    message::{ChatId, SentMessage, Update},
    model::{AccountId, Category, Goal, GoalStatus},
    traits::{DomainGateway, MessagingClient},
};
use goalbot_memory::Store;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Messaging client that replays scripted poll results and records replies.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(ChatId, String)>>,
    pub polls: Mutex<VecDeque<Result<Vec<Update>, GoalbotError>>>,
    pub offsets_seen: Mutex<Vec<i64>>,
    /// When true, `send_reply()` fails (simulates gateway outage).
    pub fail_send: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn script(&self, poll: Result<Vec<Update>, GoalbotError>) {
        self.polls.lock().unwrap().push_back(poll);
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_to(&self, chat_id: ChatId) -> String {
        self.sent_to(chat_id).pop().unwrap_or_default()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    fn name(&self) -> &str {
        "recording"
    }

    async fn fetch_updates(
        &self,
        offset: i64,
        _wait: Duration,
    ) -> Result<Vec<Update>, GoalbotError> {
        self.offsets_seen.lock().unwrap().push(offset);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, GoalbotError> {
        if self.fail_send {
            return Err(GoalbotError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(SentMessage {
            chat_id,
            text: text.to_string(),
        })
    }
}

/// In-memory goal tracker.
#[derive(Default)]
pub struct FakeDomain {
    pub categories: Mutex<Vec<Category>>,
    pub goals: Mutex<Vec<Goal>>,
    /// When true, every call fails with a storage error.
    pub broken: bool,
}

impl FakeDomain {
    pub fn with_categories(owner: AccountId, titles: &[(i64, &str)]) -> Self {
        let domain = Self::default();
        for (id, title) in titles {
            domain.add_category(*id, owner, title);
        }
        domain
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }

    pub fn add_category(&self, id: i64, owner: AccountId, title: &str) {
        self.categories.lock().unwrap().push(Category {
            id,
            title: title.to_string(),
            owner,
            board_id: 1,
        });
    }

    pub fn add_goal(&self, id: i64, owner: AccountId, title: &str, status: GoalStatus) {
        self.goals.lock().unwrap().push(Goal {
            id,
            title: title.to_string(),
            category_id: 1,
            owner,
            status,
        });
    }

    fn check(&self) -> Result<(), GoalbotError> {
        if self.broken {
            return Err(GoalbotError::Memory("database is locked".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DomainGateway for FakeDomain {
    async fn list_active_goals(&self, account: AccountId) -> Result<Vec<Goal>, GoalbotError> {
        self.check()?;
        Ok(self
            .goals
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.owner == account && g.status != GoalStatus::Archived)
            .cloned()
            .collect())
    }

    async fn list_active_categories(
        &self,
        account: AccountId,
    ) -> Result<Vec<Category>, GoalbotError> {
        self.check()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner == account)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: i64) -> Result<Category, GoalbotError> {
        self.check()?;
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| GoalbotError::DomainLookup(format!("category {id} not found")))
    }

    async fn create_goal(
        &self,
        category: &Category,
        account: AccountId,
        title: &str,
    ) -> Result<Goal, GoalbotError> {
        self.check()?;
        let mut goals = self.goals.lock().unwrap();
        let goal = Goal {
            id: goals.len() as i64 + 1,
            title: title.to_string(),
            category_id: category.id,
            owner: account,
            status: GoalStatus::ToDo,
        };
        goals.push(goal.clone());
        Ok(goal)
    }
}

/// On-disk store in a temporary directory; keep the guard alive for the test.
pub async fn temp_store() -> (Store, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("goalbot.db").to_string_lossy().to_string();
    let store = Store::new(&MemoryConfig { db_path }).await.unwrap();
    (store, dir)
}
