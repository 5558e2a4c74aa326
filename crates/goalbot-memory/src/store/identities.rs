//! Chat identity lifecycle: lazy creation, verification codes, account linking.

use super::Store;
use async_trait::async_trait;
use goalbot_core::{
    error::GoalbotError,
    message::ChatId,
    model::{AccountId, ChatIdentity, VERIFICATION_CODE_LEN},
    traits::ChatIdentityStore,
};
use rand::{distributions::Alphanumeric, Rng};
use tracing::info;

type IdentityRow = (i64, Option<i64>, Option<String>);

fn identity_from_row((chat_id, account, verification_code): IdentityRow) -> ChatIdentity {
    ChatIdentity {
        chat_id,
        account,
        verification_code,
    }
}

/// Fresh random alphanumeric verification code.
fn generate_verification_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_CODE_LEN)
        .map(char::from)
        .collect()
}

impl Store {
    /// Look up an identity without creating it.
    pub async fn get_identity(&self, chat_id: ChatId) -> Result<Option<ChatIdentity>, GoalbotError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "SELECT chat_id, account_id, verification_code FROM chat_identities WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("query failed: {e}")))?;

        Ok(row.map(identity_from_row))
    }

    /// Count identities as `(linked, pending)`.
    pub async fn identity_counts(&self) -> Result<(i64, i64), GoalbotError> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT \
                 COALESCE(SUM(CASE WHEN account_id IS NOT NULL THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN account_id IS NULL THEN 1 ELSE 0 END), 0) \
             FROM chat_identities",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("count identities failed: {e}")))?;

        Ok(row)
    }
}

#[async_trait]
impl ChatIdentityStore for Store {
    async fn get_or_create(&self, chat_id: ChatId) -> Result<ChatIdentity, GoalbotError> {
        sqlx::query("INSERT INTO chat_identities (chat_id) VALUES (?) ON CONFLICT(chat_id) DO NOTHING")
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GoalbotError::Memory(format!("upsert chat identity failed: {e}")))?;

        self.get_identity(chat_id)
            .await?
            .ok_or_else(|| GoalbotError::Memory(format!("chat identity {chat_id} vanished")))
    }

    async fn issue_verification_code(&self, chat_id: ChatId) -> Result<String, GoalbotError> {
        let code = generate_verification_code();
        sqlx::query(
            "INSERT INTO chat_identities (chat_id, verification_code) VALUES (?, ?) \
             ON CONFLICT(chat_id) DO UPDATE SET verification_code = excluded.verification_code",
        )
        .bind(chat_id)
        .bind(&code)
        .execute(&self.pool)
        .await
        .map_err(|e| GoalbotError::Memory(format!("store verification code failed: {e}")))?;

        Ok(code)
    }

    /// Single conditional UPDATE: the `account_id IS NULL` guard makes the
    /// find-and-set indivisible, so a code can be consumed at most once.
    ///
    /// The code is intentionally not cleared after linking and stays on the
    /// row as an audit trail. A consumed code cannot relink the chat (the
    /// guard rejects it), but it remains readable by anyone with database
    /// access.
    async fn link_account(
        &self,
        code: &str,
        account: AccountId,
    ) -> Result<ChatIdentity, GoalbotError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "UPDATE chat_identities SET account_id = ?, linked_at = datetime('now') \
             WHERE verification_code = ? AND account_id IS NULL \
             RETURNING chat_id, account_id, verification_code",
        )
        .bind(account)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => GoalbotError::Validation(
                format!("account {account} is already linked to another chat"),
            ),
            other => GoalbotError::Memory(format!("link account failed: {other}")),
        })?;

        let identity = row
            .map(identity_from_row)
            .ok_or_else(|| GoalbotError::NotFound("verification code is not valid".into()))?;

        info!(
            "linked chat {} to account {account}",
            identity.chat_id
        );
        Ok(identity)
    }
}
