//! Shared fixtures for unit tests: a scripted transport and ready-wired
//! clients over in-memory storage.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::api::AuthApi;
use crate::config::ClientConfig;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::net::types::{AuthTokens, User};
use crate::net::HttpClient;
use crate::notify::RecordingNotifier;
use crate::router::RecordingNavigator;
use crate::state::auth::AuthStore;
use crate::state::session::SessionStore;
use crate::storage::{KeyValueStore, MemoryStorage};

pub const BASE_URL: &str = "http://api.test/api/v1";

// =============================================================================
// MockTransport
// =============================================================================

enum Scripted {
    Response(HttpResponse),
    Fail,
    Unbuildable(String),
}

/// Replays queued responses in order and records every request it sees.
/// An exhausted queue answers 500 so unexpected calls fail loudly.
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        let body = serde_json::to_vec(&body).unwrap();
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted::Response(HttpResponse { status, body }));
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted::Response(HttpResponse { status, body: body.as_bytes().to_vec() }));
    }

    /// Queue a successful envelope around `data`.
    pub fn ok(&self, data: Value) {
        self.respond(200, envelope(data));
    }

    pub fn fail_network(&self) {
        self.queue.lock().unwrap().push_back(Scripted::Fail);
    }

    pub fn fail_build(&self, reason: &str) {
        self.queue.lock().unwrap().push_back(Scripted::Unbuildable(reason.to_owned()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.queue.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Fail) => Err(TransportError::Connect("connection refused".into())),
            Some(Scripted::Unbuildable(reason)) => Err(TransportError::Build(reason)),
            None => Ok(HttpResponse { status: 500, body: br#"{"message":"unscripted request"}"#.to_vec() }),
        }
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn envelope(data: Value) -> Value {
    json!({
        "success": true,
        "code": "SUCCESS",
        "message": "ok",
        "data": data,
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

pub fn paginated(items: Value, total: u64) -> Value {
    let mut body = envelope(items);
    body["pagination"] = json!({
        "page": 1, "pages": 1, "per_page": 10, "total": total, "has_next": false, "has_prev": false
    });
    body
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "is_active": true,
        "created_at": "2024-01-01T00:00:00Z",
        "login_count": 1,
    })
}

pub fn user(id: i64, username: &str) -> User {
    serde_json::from_value(user_json(id, username)).unwrap()
}

pub fn tokens(access: &str, refresh: &str) -> AuthTokens {
    AuthTokens {
        access_token: access.to_owned(),
        refresh_token: refresh.to_owned(),
        expires_in: 3600,
        token_type: "Bearer".to_owned(),
    }
}

pub fn auth_response_json(id: i64, username: &str, access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(id, username),
        "tokens": { "access_token": access, "refresh_token": refresh, "expires_in": 3600, "token_type": "Bearer" },
    })
}

pub fn article_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "Body text long enough.",
        "summary": "summary",
        "slug": format!("article-{id}"),
        "is_published": true,
        "allow_comments": true,
        "views": 10,
        "likes": 1,
        "comment_count": 0,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "author": { "id": 1, "username": "ann" },
        "tags": [{ "id": 1, "name": "rust" }],
    })
}

// =============================================================================
// HARNESS
// =============================================================================

/// Everything a test needs to observe the wrapper's side effects.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<SessionStore>,
    pub http: Arc<HttpClient>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    pub fn with_storage(storage: MemoryStorage) -> Self {
        let transport = MockTransport::new();
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let session = Arc::new(SessionStore::restore(storage.clone() as Arc<dyn KeyValueStore>));
        let http = Arc::new(HttpClient::new(
            ClientConfig::new(BASE_URL).unwrap(),
            transport.clone(),
            session.clone(),
            notifier.clone(),
            navigator.clone(),
        ));
        Self { transport, storage, notifier, navigator, session, http }
    }

    /// Harness whose session is already logged in as `ann` with `tok-a`/`tok-r`.
    pub fn logged_in() -> Self {
        let harness = Self::new();
        harness.session.establish(user(1, "ann"), &tokens("tok-a", "tok-r"));
        harness
    }

    pub fn auth_store(&self) -> Arc<AuthStore> {
        Arc::new(AuthStore::new(AuthApi::new(self.http.clone()), self.session.clone()))
    }
}
