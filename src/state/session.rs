//! In-memory session mirrored to durable storage.
//!
//! DESIGN
//! ======
//! The session is an explicitly constructed value shared by `Arc` between
//! the HTTP wrapper (reads the token, clears on 401), the auth store
//! (populates it) and the navigation guard (reads status). Every mutation
//! updates memory and storage inside one critical section, so the two never
//! disagree for longer than a single call.
//!
//! ERROR HANDLING
//! ==============
//! Storage write failures are logged and do not fail the auth operation:
//! the in-memory session stays authoritative for the running process.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::types::{AuthTokens, User};
use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_INFO_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Holds iff both a non-empty access token and a user are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.has_access_token() && self.user.is_some()
    }

    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

pub struct SessionStore {
    state: Mutex<Session>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Empty session; storage is written to but not read.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { state: Mutex::new(Session::default()), storage }
    }

    /// Rebuild the session from whatever a previous run persisted.
    ///
    /// A corrupt `user_info` entry is dropped; the token alone is kept so
    /// `init_user` can reconcile it against the server.
    #[must_use]
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let access_token = storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty());
        let refresh_token = storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty());
        let user = storage
            .get(USER_INFO_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable user_info");
                    None
                }
            });

        let session = Session { user, access_token, refresh_token };
        tracing::debug!(
            has_token = session.has_access_token(),
            has_user = session.user.is_some(),
            "session restored"
        );
        Self { state: Mutex::new(session), storage }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "session persist failed");
        }
    }

    fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => self.persist(USER_INFO_KEY, &raw),
            Err(e) => tracing::warn!(error = %e, "user_info encode failed"),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.lock()
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.lock()
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// A token survived a reload but the user has not been fetched yet.
    #[must_use]
    pub fn needs_user(&self) -> bool {
        let session = self.lock();
        session.has_access_token() && session.user.is_none()
    }

    /// Store a fresh credential exchange: user and both tokens.
    pub fn establish(&self, user: User, tokens: &AuthTokens) {
        let mut session = self.lock();
        self.persist(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.persist(REFRESH_TOKEN_KEY, &tokens.refresh_token);
        self.persist_user(&user);
        tracing::info!(user_id = user.id, username = %user.username, "session established");
        *session = Session {
            user: Some(user),
            access_token: Some(tokens.access_token.clone()),
            refresh_token: Some(tokens.refresh_token.clone()),
        };
    }

    pub fn set_access_token(&self, token: &str) {
        let mut session = self.lock();
        self.persist(ACCESS_TOKEN_KEY, token);
        session.access_token = Some(token.to_owned());
    }

    /// Replace the user wholesale.
    pub fn set_user(&self, user: User) {
        let mut session = self.lock();
        self.persist_user(&user);
        session.user = Some(user);
    }

    /// Drop everything, in memory and in storage.
    pub fn clear(&self) {
        let mut session = self.lock();
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "session key removal failed");
            }
        }
        if session.has_access_token() || session.user.is_some() {
            tracing::info!("session cleared");
        }
        *session = Session::default();
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
