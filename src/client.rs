//! Client assembly.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! KeyValueStore ──> SessionStore ──┬──> HttpClient ──> Transport
//!                                  │       │  ├─ Notifier
//!                                  │       │  └─ Navigator
//!                                  └──> AuthStore ──> NavigationGuard ──> Router
//!                  HttpClient ──> ArticlesStore / CommentsApi / UploadApi
//! ```
//!
//! Every dependency is passed in explicitly. Lifecycle: construct, then
//! `init()` to reconcile a restored token with the server; `logout()` tears
//! the session down and drops cached entities.
//!
//! Forced navigations reach the injected `Navigator` and are also kept for
//! the client's own router; `router_mut().follow_forced()` moves it there.

use std::sync::Arc;

use crate::api::{ArticlesApi, AuthApi, CommentsApi, UploadApi};
use crate::config::ClientConfig;
use crate::forms::DraftStore;
use crate::net::types::User;
use crate::net::{HttpClient, ReqwestTransport, Transport, TransportError};
use crate::notify::Notifier;
use crate::router::{NavigationGuard, Navigator, RouteTable, Router, TrackingNavigator};
use crate::state::{ArticlesStore, AuthStore, SessionStore};
use crate::storage::KeyValueStore;

pub struct BlogClient {
    http: Arc<HttpClient>,
    session: Arc<SessionStore>,
    auth: Arc<AuthStore>,
    articles: ArticlesStore,
    comments: CommentsApi,
    upload: UploadApi,
    drafts: DraftStore,
    router: Router,
}

impl BlogClient {
    /// Client over the real network.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, transport, storage, notifier, navigator))
    }

    #[must_use]
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        tracing::debug!(base_url = %config.base_url, "building blog client");
        let session = Arc::new(SessionStore::restore(storage.clone()));
        let navigator = Arc::new(TrackingNavigator::new(navigator));
        let http = Arc::new(HttpClient::new(config, transport, session.clone(), notifier, navigator.clone()));
        let auth = Arc::new(AuthStore::new(AuthApi::new(http.clone()), session.clone()));
        let router = Router::with_forced(NavigationGuard::new(auth.clone(), RouteTable::blog()), navigator);

        Self {
            articles: ArticlesStore::new(ArticlesApi::new(http.clone())),
            comments: CommentsApi::new(http.clone()),
            upload: UploadApi::new(http.clone()),
            drafts: DraftStore::new(storage),
            http,
            session,
            auth,
            router,
        }
    }

    /// Reconcile a restored session with the server. Safe to call repeatedly.
    pub async fn init(&self) -> Option<User> {
        self.auth.init_user().await
    }

    /// Log out and drop every cached entity.
    pub async fn logout(&mut self) {
        self.auth.logout().await;
        self.articles.articles.clear();
        self.articles.clear_current_article();
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    #[must_use]
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    #[must_use]
    pub fn articles(&self) -> &ArticlesStore {
        &self.articles
    }

    pub fn articles_mut(&mut self) -> &mut ArticlesStore {
        &mut self.articles
    }

    #[must_use]
    pub fn comments(&self) -> &CommentsApi {
        &self.comments
    }

    #[must_use]
    pub fn upload(&self) -> &UploadApi {
        &self.upload
    }

    #[must_use]
    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
