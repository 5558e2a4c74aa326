//! Long-poll fetch, response decoding, and the `MessagingClient` impl.

use super::types::{TgResponse, TgUpdate};
use super::{TelegramClient, REQUEST_TIMEOUT_SLACK_SECS};
use async_trait::async_trait;
use goalbot_core::{
    error::GoalbotError,
    message::{ChatId, SentMessage, Update},
    traits::MessagingClient,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[async_trait]
impl MessagingClient for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn fetch_updates(
        &self,
        offset: i64,
        wait: Duration,
    ) -> Result<Vec<Update>, GoalbotError> {
        let url = format!("{}/getUpdates", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("timeout", wait.as_secs() as i64)])
            .timeout(wait + Duration::from_secs(REQUEST_TIMEOUT_SLACK_SECS))
            .send()
            .await
            .map_err(|e| GoalbotError::Transport(format!("telegram getUpdates failed: {e}")))?;

        let mut updates: Vec<TgUpdate> = decode_response(resp, "getUpdates").await?;
        updates.sort_by_key(|u| u.update_id);

        debug!("telegram: fetched {} update(s) at offset {offset}", updates.len());
        Ok(updates.into_iter().map(Update::from).collect())
    }

    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, GoalbotError> {
        self.send_text(chat_id, text).await
    }
}

/// Check the HTTP status, then decode the `{ok, result}` envelope strictly.
///
/// Non-success statuses and `ok: false` are transport failures; a body that
/// does not match the expected shape is a protocol decode failure.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    method: &str,
) -> Result<T, GoalbotError> {
    let status = resp.status();
    if !status.is_success() {
        let error_text = resp.text().await.unwrap_or_default();
        return Err(GoalbotError::Transport(format!(
            "telegram {method} failed ({status}): {error_text}"
        )));
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| GoalbotError::Transport(format!("telegram {method} read failed: {e}")))?;

    let envelope: TgResponse<T> = serde_json::from_slice(&body).map_err(|e| {
        GoalbotError::ProtocolDecode(format!("telegram {method} response: {e}"))
    })?;

    if !envelope.ok {
        return Err(GoalbotError::Transport(format!(
            "telegram {method} rejected: {}",
            envelope.description.unwrap_or_default()
        )));
    }

    envelope.result.ok_or_else(|| {
        GoalbotError::ProtocolDecode(format!("telegram {method} response has no result"))
    })
}
