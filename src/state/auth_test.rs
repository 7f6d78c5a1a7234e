use serde_json::json;
use tokio::sync::Notify;

use super::*;
use crate::config::ClientConfig;
use crate::net::HttpClient;
use crate::net::http::SESSION_EXPIRED_MESSAGE;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::notify::RecordingNotifier;
use crate::router::RecordingNavigator;
use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, MemoryStorage, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_INFO_KEY};
use crate::test_support::{BASE_URL, Harness, MockTransport, auth_response_json, user_json};

fn credentials() -> LoginRequest {
    LoginRequest { username: "u".into(), password: "p".into() }
}

fn assert_storage_empty(h: &Harness) {
    for key in SESSION_KEYS {
        assert!(h.storage.get(key).is_none(), "{key} should be removed");
    }
}

// =============================================================================
// login / register
// =============================================================================

#[tokio::test]
async fn login_authenticates_and_stores_tokens_verbatim() {
    let h = Harness::new();
    let auth = h.auth_store();
    h.transport.ok(auth_response_json(1, "u", "access-XYZ", "refresh-XYZ"));

    let response = auth.login(&credentials()).await.unwrap();

    assert_eq!(response.user.username, "u");
    assert!(auth.is_authenticated());
    assert_eq!(auth.status(), AuthStatus::Authenticated);
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-XYZ"));
    assert_eq!(h.storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-XYZ"));
    assert!(h.storage.get(USER_INFO_KEY).is_some());
    assert!(!auth.is_loading());
}

#[tokio::test]
async fn failed_login_persists_nothing_and_clears_loading() {
    let h = Harness::new();
    let auth = h.auth_store();
    h.transport.respond(400, json!({ "success": false, "error": { "code": "INVALID", "message": "bad credentials" } }));

    let err = auth.login(&credentials()).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
    assert_eq!(auth.status(), AuthStatus::Anonymous);
    assert!(!auth.is_loading());
    assert_storage_empty(&h);
    assert_eq!(h.notifier.messages(), vec!["bad credentials"]);
}

#[tokio::test]
async fn register_authenticates() {
    let h = Harness::new();
    let auth = h.auth_store();
    h.transport.ok(auth_response_json(5, "newbie", "a", "r"));

    let data = RegisterRequest {
        username: "newbie".into(),
        email: "newbie@example.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    };
    auth.register(&data).await.unwrap();

    assert_eq!(auth.current_user().unwrap().id, 5);
    assert!(auth.is_authenticated());
}

/// Holds each request until released, so a test can look at the store
/// while the call is still in flight.
struct GatedTransport {
    inner: Arc<MockTransport>,
    entered: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.send(request).await
    }
}

#[tokio::test]
async fn status_is_authenticating_while_login_in_flight() {
    let inner = MockTransport::new();
    inner.ok(auth_response_json(1, "u", "tok-a", "tok-r"));
    let gate = Arc::new(GatedTransport { inner, entered: Notify::new(), release: Notify::new() });
    let session = Arc::new(SessionStore::restore(Arc::new(MemoryStorage::new())));
    let http = Arc::new(HttpClient::new(
        ClientConfig::new(BASE_URL).unwrap(),
        gate.clone(),
        session.clone(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(RecordingNavigator::new()),
    ));
    let auth = Arc::new(AuthStore::new(AuthApi::new(http), session));
    assert_eq!(auth.status(), AuthStatus::Anonymous);

    let task = tokio::spawn({
        let auth = auth.clone();
        async move { auth.login(&credentials()).await }
    });
    gate.entered.notified().await;

    assert_eq!(auth.status(), AuthStatus::Authenticating);
    assert!(auth.is_loading());

    gate.release.notify_one();
    task.await.unwrap().unwrap();
    assert_eq!(auth.status(), AuthStatus::Authenticated);
    assert!(!auth.is_loading());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_even_when_server_rejects() {
    let h = Harness::logged_in();
    let auth = h.auth_store();
    h.transport.respond(500, json!({ "message": "boom" }));

    auth.logout().await;

    assert_eq!(h.transport.request_count(), 1);
    assert!(!auth.is_authenticated());
    assert_eq!(auth.session().snapshot(), crate::state::session::Session::default());
    assert_storage_empty(&h);
}

#[tokio::test]
async fn logout_clears_when_network_fails() {
    let h = Harness::logged_in();
    let auth = h.auth_store();
    h.transport.fail_network();

    auth.logout().await;

    assert!(!auth.is_authenticated());
    assert_storage_empty(&h);
}

#[tokio::test]
async fn logout_without_token_skips_server() {
    let h = Harness::new();
    let auth = h.auth_store();
    auth.logout().await;
    assert_eq!(h.transport.request_count(), 0);
}

// =============================================================================
// init_user
// =============================================================================

#[tokio::test]
async fn init_user_is_idempotent_with_loaded_user() {
    let h = Harness::logged_in();
    let auth = h.auth_store();

    auth.init_user().await;
    auth.init_user().await;

    assert_eq!(h.transport.request_count(), 0);
    assert_eq!(auth.current_user().unwrap().username, "ann");
}

#[tokio::test]
async fn init_user_without_token_does_nothing() {
    let h = Harness::new();
    let auth = h.auth_store();
    assert!(auth.init_user().await.is_none());
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn init_user_fetches_user_for_restored_token() {
    let h = Harness::with_storage(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "tok")]));
    let auth = h.auth_store();
    h.transport.ok(json!({ "user": user_json(3, "carol") }));

    let user = auth.init_user().await.unwrap();

    assert_eq!(user.username, "carol");
    assert!(auth.is_authenticated());
    assert!(h.storage.get(USER_INFO_KEY).is_some());
    assert_eq!(h.transport.last_request().header("Authorization"), Some("Bearer tok"));

    auth.init_user().await;
    assert_eq!(h.transport.request_count(), 1);
}

#[tokio::test]
async fn init_user_401_logs_out_once() {
    let h = Harness::with_storage(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "stale")]));
    let auth = h.auth_store();
    h.transport.respond(401, json!({ "message": "token expired" }));

    assert!(auth.init_user().await.is_none());

    assert_eq!(h.transport.request_count(), 1, "no server logout after the session is already gone");
    assert_eq!(auth.status(), AuthStatus::Anonymous);
    assert_storage_empty(&h);
    assert_eq!(h.navigator.history().len(), 1);
    assert_eq!(h.notifier.messages(), vec![SESSION_EXPIRED_MESSAGE]);
}

#[tokio::test]
async fn init_user_server_error_logs_out() {
    let h = Harness::with_storage(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "tok")]));
    let auth = h.auth_store();
    h.transport.respond(500, json!({ "message": "db down" }));
    h.transport.ok(json!(null));

    assert!(auth.init_user().await.is_none());

    assert!(h.transport.last_request().url.ends_with("/auth/logout"));
    assert_storage_empty(&h);
}

// =============================================================================
// refresh
// =============================================================================

#[tokio::test]
async fn refresh_replaces_access_token_only() {
    let h = Harness::logged_in();
    let auth = h.auth_store();
    h.transport.ok(json!({ "access_token": "tok-b", "expires_in": 3600 }));

    let token = auth.refresh_access_token().await.unwrap();

    assert_eq!(token, "tok-b");
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("tok-b"));
    assert_eq!(h.storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("tok-r"));
    assert!(auth.is_authenticated());
}

#[tokio::test]
async fn refresh_failure_logs_out_and_returns_error() {
    let h = Harness::logged_in();
    let auth = h.auth_store();
    h.transport.respond(400, json!({ "error": { "message": "refresh token invalid" } }));
    h.transport.ok(json!(null));

    let err = auth.refresh_access_token().await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { .. }));
    assert_eq!(auth.status(), AuthStatus::Anonymous);
    assert_storage_empty(&h);
}

#[tokio::test]
async fn refresh_without_refresh_token() {
    let h = Harness::new();
    let auth = h.auth_store();
    let err = auth.refresh_access_token().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingRefreshToken));
    assert_eq!(h.transport.request_count(), 0);
}

// =============================================================================
// profile & roles
// =============================================================================

#[tokio::test]
async fn update_profile_replaces_stored_user() {
    let h = Harness::logged_in();
    let auth = h.auth_store();
    let mut updated = user_json(1, "ann");
    updated["display_name"] = json!("Ann A.");
    h.transport.ok(json!({ "user": updated }));

    let update = ProfileUpdate { display_name: Some("Ann A.".into()), ..ProfileUpdate::default() };
    auth.update_profile(&update).await.unwrap();

    assert_eq!(auth.current_user().unwrap().display_name.as_deref(), Some("Ann A."));
    let stored: User = serde_json::from_str(&h.storage.get(USER_INFO_KEY).unwrap()).unwrap();
    assert_eq!(stored.display_name.as_deref(), Some("Ann A."));
}

#[tokio::test]
async fn admin_is_username_admin() {
    let h = Harness::new();
    let auth = h.auth_store();
    assert!(!auth.is_admin());
    h.transport.ok(auth_response_json(1, "admin", "a", "r"));
    auth.login(&LoginRequest { username: "admin".into(), password: "x".into() }).await.unwrap();
    assert!(auth.is_admin());
}
