//! Authentication state machine over the shared session.
//!
//! STATES
//! ======
//! `Anonymous` -> `Authenticating` when login/register starts;
//! `Authenticating` -> `Authenticated` on a successful exchange (user and
//! both tokens stored and persisted) or back to `Anonymous` on failure.
//! `Authenticated` -> `Anonymous` on logout, refresh failure, or a 401 seen
//! by the HTTP wrapper.
//!
//! Overlapping login/refresh calls are not serialized; the last write wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::AuthApi;
use crate::error::ApiError;
use crate::net::types::{AuthResponse, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, User};
use crate::state::session::SessionStore;

/// Username that grants the admin views.
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Clears the loading flag however the exchange future ends, including
/// being dropped mid-flight.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AuthStore {
    api: AuthApi,
    session: Arc<SessionStore>,
    loading: AtomicBool,
}

impl AuthStore {
    #[must_use]
    pub fn new(api: AuthApi, session: Arc<SessionStore>) -> Self {
        Self { api, session, loading: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session
            .user()
            .is_some_and(|u| u.username == ADMIN_USERNAME)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        if self.is_loading() {
            AuthStatus::Authenticating
        } else if self.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }

    /// Reconcile a token that survived a reload with the server's view of
    /// its user. Does nothing (and sends nothing) unless a token is held
    /// without a user; on failure the session is logged out.
    pub async fn init_user(&self) -> Option<User> {
        if !self.session.needs_user() {
            return self.session.user();
        }
        match self.api.me().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session user loaded");
                self.session.set_user(user.clone());
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session user fetch failed, logging out");
                self.logout().await;
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns the surfaced failure; the session is left as it was.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let _loading = LoadingGuard::start(&self.loading);
        let response = self.api.login(credentials).await?;
        self.session.establish(response.user.clone(), &response.tokens);
        Ok(response)
    }

    /// # Errors
    ///
    /// Returns the surfaced failure; the session is left as it was.
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let _loading = LoadingGuard::start(&self.loading);
        let response = self.api.register(data).await?;
        self.session.establish(response.user.clone(), &response.tokens);
        Ok(response)
    }

    /// Best-effort server logout, then an unconditional local clear.
    pub async fn logout(&self) {
        let outcome = match self.session.access_token() {
            Some(_) => self.api.logout().await,
            None => Ok(()),
        };
        if let Err(e) = outcome {
            tracing::debug!(error = %e, "server logout failed, clearing locally");
        }
        self.session.clear();
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `MissingRefreshToken` or the request failure; either way the
    /// session has been logged out.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.logout().await;
            return Err(ApiError::MissingRefreshToken);
        };
        match self.api.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.session.set_access_token(&refreshed.access_token);
                tracing::info!(expires_in = refreshed.expires_in, "access token refreshed");
                Ok(refreshed.access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, logging out");
                self.logout().await;
                Err(e)
            }
        }
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn change_password(&self, data: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.api.change_password(data).await
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        self.api.check_username(username).await
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn check_email(&self, email: &str) -> Result<bool, ApiError> {
        self.api.check_email(email).await
    }

    /// Update the profile and replace the stored user with the result.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user = self.api.update_profile(update).await?;
        self.session.set_user(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
