//! Client-side routes, locations, and the navigation seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views are addressed by path. Each route carries meta flags the
//! [`guard::NavigationGuard`] consults before every navigation. The HTTP
//! wrapper forces navigation (to `/login` on 401) through the [`Navigator`]
//! trait, so the library stays free of any particular UI shell.

pub mod guard;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Url;

pub use guard::{NavigationDecision, NavigationError, NavigationGuard, Router};

/// Synthetic origin used only to borrow `Url`'s path/query handling.
const LOCAL_ORIGIN: &str = "http://localhost";

// =============================================================================
// LOCATION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Parse `"/path?k=v"`; a missing leading slash is added.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let rooted = if raw.starts_with('/') { raw.to_owned() } else { format!("/{raw}") };
        match Url::parse(&format!("{LOCAL_ORIGIN}{rooted}")) {
            Ok(url) => Self {
                path: url.path().to_owned(),
                query: url.query_pairs().into_owned().collect(),
            },
            Err(_) => Self::new(rooted),
        }
    }

    /// Path plus encoded query string, the form used for `redirect` targets.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let Ok(mut url) = Url::parse(LOCAL_ORIGIN) else {
            return self.path.clone();
        };
        url.query_pairs_mut().extend_pairs(&self.query);
        format!("{}?{}", self.path, url.query().unwrap_or_default())
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_path())
    }
}

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self { requires_auth: false, requires_guest: false };
    pub const AUTH: Self = Self { requires_auth: true, requires_guest: false };
    pub const GUEST: Self = Self { requires_auth: false, requires_guest: true };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    /// Segments starting with `:` bind one path segment.
    pub pattern: &'static str,
    pub meta: RouteMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub meta: RouteMeta,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The blog's views.
    #[must_use]
    pub fn blog() -> Self {
        let route = |name, pattern, meta| Route { name, pattern, meta };
        Self::new(vec![
            route("home", "/", RouteMeta::PUBLIC),
            route("login", "/login", RouteMeta::GUEST),
            route("register", "/register", RouteMeta::GUEST),
            route("articles", "/articles", RouteMeta::PUBLIC),
            route("article-create", "/articles/create", RouteMeta::AUTH),
            route("article-detail", "/articles/:id", RouteMeta::PUBLIC),
            route("article-edit", "/articles/:id/edit", RouteMeta::AUTH),
            route("profile", "/profile", RouteMeta::AUTH),
            route("dashboard", "/dashboard", RouteMeta::AUTH),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Match `path` against the table. Among matching routes the one with
    /// the fewest `:param` segments wins, so static paths shadow params.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let segments = split_segments(path);
        self.routes
            .iter()
            .filter_map(|route| match_pattern(route.pattern, &segments).map(|params| (route, params)))
            .min_by_key(|(_, params)| params.len())
            .map(|(route, params)| RouteMatch { name: route.name, meta: route.meta, params })
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> Option<&'static str> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.pattern)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::blog()
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let expected = split_segments(pattern);
    if expected.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(segments) {
        if let Some(name) = want.strip_prefix(':') {
            params.insert(name.to_owned(), (*got).to_owned());
        } else if want != got {
            return None;
        }
    }
    Some(params)
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Where forced navigations (e.g. the 401 redirect) are sent.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Location);
}

/// In-memory history of forced navigations.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Location>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Location> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Location> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: Location) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(to);
    }
}

/// Forwards forced navigations to the shell's navigator and keeps the latest
/// target so a [`Router`] can catch up with [`Router::follow_forced`].
pub struct TrackingNavigator {
    inner: Arc<dyn Navigator>,
    pending: Mutex<Option<Location>>,
}

impl TrackingNavigator {
    #[must_use]
    pub fn new(inner: Arc<dyn Navigator>) -> Self {
        Self { inner, pending: Mutex::new(None) }
    }

    #[must_use]
    pub fn take_pending(&self) -> Option<Location> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Navigator for TrackingNavigator {
    fn navigate(&self, to: Location) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(to.clone());
        self.inner.navigate(to);
    }
}

/// Logs forced navigations; for shells with nowhere to navigate to.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, to: Location) {
        tracing::info!(location = %to, "navigation requested");
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
