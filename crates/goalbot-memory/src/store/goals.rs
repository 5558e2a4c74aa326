//! Goal-tracker access backing the bot's domain commands.

use super::Store;
use async_trait::async_trait;
use goalbot_core::{
    error::GoalbotError,
    model::{AccountId, Category, Goal, GoalStatus},
    traits::DomainGateway,
};

type GoalRow = (i64, String, i64, i64, i64);
type CategoryRow = (i64, String, i64, i64);

fn goal_from_row((id, title, category_id, owner, status): GoalRow) -> Result<Goal, GoalbotError> {
    let status = GoalStatus::from_code(status)
        .ok_or_else(|| GoalbotError::Memory(format!("goal {id} has unknown status {status}")))?;
    Ok(Goal {
        id,
        title,
        category_id,
        owner,
        status,
    })
}

fn category_from_row((id, title, owner, board_id): CategoryRow) -> Category {
    Category {
        id,
        title,
        owner,
        board_id,
    }
}

#[async_trait]
impl DomainGateway for Store {
    async fn list_active_goals(&self, account: AccountId) -> Result<Vec<Goal>, GoalbotError> {
        let rows: Vec<GoalRow> = sqlx::query_as(
            "SELECT id, title, category_id, user_id, status FROM goals \
             WHERE user_id = ? AND status != ? ORDER BY id",
        )
        .bind(account)
        .bind(GoalStatus::Archived.code())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("list goals failed: {e}")))?;

        rows.into_iter().map(goal_from_row).collect()
    }

    async fn list_active_categories(
        &self,
        account: AccountId,
    ) -> Result<Vec<Category>, GoalbotError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, title, user_id, board_id FROM goal_categories \
             WHERE user_id = ? AND is_deleted = 0 ORDER BY id",
        )
        .bind(account)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("list categories failed: {e}")))?;

        Ok(rows.into_iter().map(category_from_row).collect())
    }

    async fn get_category(&self, id: i64) -> Result<Category, GoalbotError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, title, user_id, board_id FROM goal_categories \
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("get category failed: {e}")))?;

        row.map(category_from_row)
            .ok_or_else(|| GoalbotError::DomainLookup(format!("category {id} not found")))
    }

    async fn create_goal(
        &self,
        category: &Category,
        account: AccountId,
        title: &str,
    ) -> Result<Goal, GoalbotError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO goals (title, category_id, user_id, status) VALUES (?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(title)
        .bind(category.id)
        .bind(account)
        .bind(GoalStatus::ToDo.code())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("create goal failed: {e}")))?;

        Ok(Goal {
            id,
            title: title.to_string(),
            category_id: category.id,
            owner: account,
            status: GoalStatus::ToDo,
        })
    }
}
