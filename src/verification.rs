//! Account-linking handshake triggered by the web app.

use crate::engine::replies;
use goalbot_core::{
    error::GoalbotError,
    model::{AccountId, ChatIdentity},
    traits::{ChatIdentityStore, MessagingClient},
};
use tracing::warn;

/// Link the chat holding `code` to `account` and tell the chat about it.
///
/// Unknown codes fail with `NotFound` before the gateway is contacted. A
/// failed confirmation message is logged; the link stays committed.
pub async fn verify(
    identities: &dyn ChatIdentityStore,
    messenger: &dyn MessagingClient,
    code: &str,
    account: AccountId,
) -> Result<ChatIdentity, GoalbotError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(GoalbotError::Validation(
            "verification code is required".into(),
        ));
    }

    let identity = identities.link_account(code, account).await?;

    if let Err(e) = messenger
        .send_reply(identity.chat_id, replies::VERIFIED)
        .await
    {
        warn!(
            "verification confirmation to chat {} not delivered: {e}",
            identity.chat_id
        );
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{temp_store, RecordingMessenger};

    #[tokio::test]
    async fn test_verify_links_and_confirms() {
        let (store, _dir) = temp_store().await;
        let code = store.issue_verification_code(42).await.unwrap();
        let messenger = RecordingMessenger::default();

        let identity = verify(&store, &messenger, &code, 5).await.unwrap();

        assert_eq!(identity.account, Some(5));
        assert_eq!(messenger.sent_to(42), vec!["Bot token verified!".to_string()]);
    }

    #[tokio::test]
    async fn test_verify_unknown_code_sends_nothing() {
        let (store, _dir) = temp_store().await;
        store.issue_verification_code(42).await.unwrap();
        let messenger = RecordingMessenger::default();

        let err = verify(&store, &messenger, "Invalid verification code", 5)
            .await
            .unwrap_err();

        assert!(matches!(err, GoalbotError::NotFound(_)));
        assert!(messenger.sent.lock().unwrap().is_empty());
        assert!(!store.get_identity(42).await.unwrap().unwrap().is_verified());
    }

    #[tokio::test]
    async fn test_verify_blank_code_is_validation_error() {
        let (store, _dir) = temp_store().await;
        let messenger = RecordingMessenger::default();
        let err = verify(&store, &messenger, "  ", 5).await.unwrap_err();
        assert!(matches!(err, GoalbotError::Validation(_)));
    }

    #[tokio::test]
    async fn test_verify_survives_send_failure() {
        let (store, _dir) = temp_store().await;
        let code = store.issue_verification_code(42).await.unwrap();
        let messenger = RecordingMessenger::failing();

        let identity = verify(&store, &messenger, &code, 5).await.unwrap();
        assert!(identity.is_verified());
    }
}
