//! HTTP API for the goal-tracker web app.
//!
//! Provides the account-linking endpoint and a health check. Spawned as a
//! background task next to the dispatch loop.

use crate::verification;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch},
    Router,
};
use goalbot_core::{
    config::ApiConfig,
    error::GoalbotError,
    model::AccountId,
    traits::{ChatIdentityStore, MessagingClient},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Header carrying the account id authenticated by the web app's session layer.
const ACCOUNT_HEADER: &str = "x-account-id";

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    identities: Arc<dyn ChatIdentityStore>,
    messenger: Arc<dyn MessagingClient>,
    api_key: String,
    uptime: Instant,
    offset: Arc<AtomicI64>,
}

impl ApiState {
    /// Fails with `Config` when no `api_key` is set: the account header is
    /// only trusted from a caller holding the shared key.
    pub fn new(
        identities: Arc<dyn ChatIdentityStore>,
        messenger: Arc<dyn MessagingClient>,
        config: &ApiConfig,
        offset: Arc<AtomicI64>,
    ) -> Result<Self, GoalbotError> {
        if config.api_key.trim().is_empty() {
            return Err(GoalbotError::Config(
                "api.enabled requires a non-empty api.api_key".into(),
            ));
        }
        Ok(Self {
            identities,
            messenger,
            api_key: config.api_key.clone(),
            uptime: Instant::now(),
            offset,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    verification_code: String,
}

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({"error": message.into()})))
}

/// Constant-time string comparison for API token validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth. Returns `Err` with the rejection if unauthorized.
fn check_auth(headers: &HeaderMap, key: &str) -> Result<(), ApiError> {
    let value = headers
        .get("authorization")
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing Authorization header"))?
        .to_str()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid Authorization header"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => Ok(()),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

/// Account id from the session header. Must be a positive integer.
fn account_from(headers: &HeaderMap) -> Result<AccountId, ApiError> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.trim().parse::<AccountId>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing or invalid account"))
}

/// `GET /api/health` -- uptime and dispatch-loop progress.
async fn health(headers: HeaderMap, State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;

    Ok(Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
        "offset": state.offset.load(Ordering::Relaxed),
        "messenger": state.messenger.name(),
    })))
}

/// `PATCH /api/bot/verify` -- link the chat holding the code to the caller's account.
async fn verify(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let account = account_from(&headers)?;

    let Json(request) =
        body.map_err(|e| reject(StatusCode::BAD_REQUEST, format!("invalid request: {e}")))?;

    let identity = verification::verify(
        state.identities.as_ref(),
        state.messenger.as_ref(),
        &request.verification_code,
        account,
    )
    .await
    .map_err(|e| match e {
        GoalbotError::NotFound(_) => {
            warn!("verification for account {account} rejected: {e}");
            reject(StatusCode::BAD_REQUEST, "Invalid verification code")
        }
        GoalbotError::Validation(msg) => {
            warn!("verification for account {account} rejected: {msg}");
            reject(StatusCode::BAD_REQUEST, msg)
        }
        other => {
            error!("verification for account {account} failed: {other}");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "verification failed")
        }
    })?;

    info!("chat {} linked to account {account}", identity.chat_id);
    Ok(Json(json!({
        "chat_id": identity.chat_id,
        "account_id": account,
        "verified": true,
    })))
}

/// Build the axum router with shared state.
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/bot/verify", patch(verify))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Start the API server. Runs until the listener fails.
pub async fn serve(config: ApiConfig, state: ApiState) {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{temp_store, RecordingMessenger};
    use axum::body::Body;
    use axum::http::Request;
    use goalbot_memory::Store;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const CHAT: i64 = 42;
    const KEY: &str = "secret";

    struct TestApi {
        router: Router,
        store: Store,
        messenger: Arc<RecordingMessenger>,
        _dir: tempfile::TempDir,
    }

    async fn test_api() -> TestApi {
        let (store, dir) = temp_store().await;
        let messenger = Arc::new(RecordingMessenger::default());
        let config = ApiConfig {
            api_key: KEY.to_string(),
            ..Default::default()
        };
        let state = ApiState::new(
            Arc::new(store.clone()),
            messenger.clone(),
            &config,
            Arc::new(AtomicI64::new(17)),
        )
        .unwrap();
        TestApi {
            router: build_router(state),
            store,
            messenger,
            _dir: dir,
        }
    }

    fn verify_request(account: Option<&str>, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PATCH")
            .uri("/api/bot/verify")
            .header("content-type", "application/json");
        if let Some(account) = account {
            builder = builder.header(ACCOUNT_HEADER, account);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("hello", "hello"));
        assert!(!constant_time_eq("hello", "world"));
        assert!(!constant_time_eq("short", "longer"));
        assert!(constant_time_eq("", ""));
    }

    #[tokio::test]
    async fn test_default_config_cannot_serve_verify() {
        let (store, _dir) = temp_store().await;
        let result = ApiState::new(
            Arc::new(store),
            Arc::new(RecordingMessenger::default()),
            &ApiConfig::default(),
            Arc::new(AtomicI64::new(0)),
        );
        assert!(matches!(result, Err(GoalbotError::Config(_))));
    }

    #[tokio::test]
    async fn test_verify_without_token_does_not_link() {
        let api = test_api().await;
        let code = api.store.issue_verification_code(CHAT).await.unwrap();

        let body = format!(r#"{{"verification_code":"{code}"}}"#);
        let resp = api
            .router
            .oneshot(verify_request(Some("999"), None, &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let identity = api.store.get_identity(CHAT).await.unwrap().unwrap();
        assert!(!identity.is_verified());
        assert!(api.messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_links_chat_and_confirms() {
        let api = test_api().await;
        let code = api.store.issue_verification_code(CHAT).await.unwrap();

        let body = format!(r#"{{"verification_code":"{code}"}}"#);
        let resp = api
            .router
            .oneshot(verify_request(Some("7"), Some(KEY), &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["chat_id"], CHAT);
        assert_eq!(json["account_id"], 7);
        assert_eq!(json["verified"], true);

        assert_eq!(api.messenger.sent_to(CHAT), vec!["Bot token verified!".to_string()]);
        let identity = api.store.get_identity(CHAT).await.unwrap().unwrap();
        assert_eq!(identity.account, Some(7));
    }

    #[tokio::test]
    async fn test_verify_unknown_code_is_bad_request() {
        let api = test_api().await;
        api.store.issue_verification_code(CHAT).await.unwrap();

        let resp = api
            .router
            .oneshot(verify_request(
                Some("7"),
                Some(KEY),
                r#"{"verification_code":"nope"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Invalid verification code");
        assert!(api.messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_consumed_code_is_bad_request() {
        let api = test_api().await;
        let code = api.store.issue_verification_code(CHAT).await.unwrap();
        api.store.link_account(&code, 7).await.unwrap();

        let body = format!(r#"{{"verification_code":"{code}"}}"#);
        let resp = api
            .router
            .oneshot(verify_request(Some("8"), Some(KEY), &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let identity = api.store.get_identity(CHAT).await.unwrap().unwrap();
        assert_eq!(identity.account, Some(7), "first link stands");
    }

    #[tokio::test]
    async fn test_verify_without_account_is_unauthorized() {
        let api = test_api().await;
        let resp = api
            .router
            .clone()
            .oneshot(verify_request(None, Some(KEY), r#"{"verification_code":"x"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = api
            .router
            .oneshot(verify_request(
                Some("abc"),
                Some(KEY),
                r#"{"verification_code":"x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_requires_api_key_when_configured() {
        let api = test_api().await;
        let code = api.store.issue_verification_code(CHAT).await.unwrap();
        let body = format!(r#"{{"verification_code":"{code}"}}"#);

        let resp = api
            .router
            .clone()
            .oneshot(verify_request(Some("7"), None, &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = api
            .router
            .clone()
            .oneshot(verify_request(Some("7"), Some("wrong"), &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = api
            .router
            .oneshot(verify_request(Some("7"), Some(KEY), &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verify_malformed_body_is_bad_request() {
        let api = test_api().await;
        let resp = api
            .router
            .oneshot(verify_request(Some("7"), Some(KEY), "not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_offset() {
        let api = test_api().await;
        let resp = api
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("authorization", format!("Bearer {KEY}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["offset"], 17);
        assert!(json["uptime_secs"].is_u64());
    }
}
