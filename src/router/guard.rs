//! Navigation guard and a minimal router that honours its decisions.
//!
//! The guard runs before every navigation. A token that survived a reload
//! without its user is reconciled first (`init_user`), so the auth check
//! below always sees a settled session.

use std::sync::Arc;

use super::{Location, RouteTable, TrackingNavigator};
use crate::state::auth::AuthStore;

/// Redirect chains longer than this are treated as a routing loop.
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Location),
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("too many redirects navigating to {0}")]
    TooManyRedirects(String),
}

pub struct NavigationGuard {
    auth: Arc<AuthStore>,
    routes: RouteTable,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(auth: Arc<AuthStore>, routes: RouteTable) -> Self {
        Self { auth, routes }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn before_each(&self, to: &Location) -> NavigationDecision {
        if self.auth.session().needs_user() {
            self.auth.init_user().await;
        }

        let meta = self
            .routes
            .resolve(&to.path)
            .map(|m| m.meta)
            .unwrap_or_default();
        let authenticated = self.auth.is_authenticated();

        if meta.requires_auth && !authenticated {
            tracing::debug!(to = %to, "guard: login required");
            return NavigationDecision::Redirect(Location::new("/login").with_query("redirect", to.full_path()));
        }
        if meta.requires_guest && authenticated {
            tracing::debug!(to = %to, "guard: already logged in");
            return NavigationDecision::Redirect(Location::new("/"));
        }
        NavigationDecision::Allow
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Tracks the current location; every `push` goes through the guard.
pub struct Router {
    guard: NavigationGuard,
    current: Location,
    history: Vec<Location>,
    forced: Option<Arc<TrackingNavigator>>,
}

impl Router {
    #[must_use]
    pub fn new(guard: NavigationGuard) -> Self {
        Self { guard, current: Location::new("/"), history: Vec::new(), forced: None }
    }

    /// Router that can replay navigations forced through `navigator`.
    #[must_use]
    pub fn with_forced(guard: NavigationGuard, navigator: Arc<TrackingNavigator>) -> Self {
        Self { forced: Some(navigator), ..Self::new(guard) }
    }

    #[must_use]
    pub fn current(&self) -> &Location {
        &self.current
    }

    #[must_use]
    pub fn history(&self) -> &[Location] {
        &self.history
    }

    #[must_use]
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Navigate to `target`, following guard redirects.
    ///
    /// # Errors
    ///
    /// Returns `TooManyRedirects` if the guard keeps redirecting past
    /// [`MAX_REDIRECTS`]; the current location is left unchanged.
    pub async fn push(&mut self, target: Location) -> Result<&Location, NavigationError> {
        let requested = target.full_path();
        let mut target = target;
        for _ in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&target).await {
                NavigationDecision::Allow => {
                    tracing::debug!(from = %self.current, to = %target, "navigated");
                    let previous = std::mem::replace(&mut self.current, target);
                    self.history.push(previous);
                    return Ok(&self.current);
                }
                NavigationDecision::Redirect(next) => target = next,
            }
        }
        tracing::warn!(%requested, "redirect loop");
        Err(NavigationError::TooManyRedirects(requested))
    }

    /// Push the latest forced navigation (the 401 redirect), if one is
    /// waiting. Returns `None` when there is nothing to follow.
    ///
    /// # Errors
    ///
    /// See [`Router::push`].
    pub async fn follow_forced(&mut self) -> Result<Option<&Location>, NavigationError> {
        let Some(target) = self.forced.as_ref().and_then(|n| n.take_pending()) else {
            return Ok(None);
        };
        self.push(target).await.map(Some)
    }

    /// [`Router::push`] for a raw `"/path?query"` string.
    ///
    /// # Errors
    ///
    /// See [`Router::push`].
    pub async fn push_path(&mut self, raw: &str) -> Result<&Location, NavigationError> {
        self.push(Location::parse(raw)).await
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
