//! HTTP client wrapper: the single request facility every endpoint uses.
//!
//! ARCHITECTURE
//! ============
//! Outgoing: the request interceptor attaches `Authorization: Bearer <token>`
//! whenever the session holds a non-empty access token. No request skips it.
//!
//! Incoming: the response interceptor runs before any caller sees a result.
//! - no response      -> notify network error, `ApiError::Network`
//! - 401              -> clear session + storage, notify, navigate to login,
//!   `ApiError::AuthExpired`
//! - other non-2xx    -> notify extracted message, `ApiError::Rejected`
//! - 2xx              -> passed through unchanged
//!
//! Endpoint modules therefore never format failures themselves.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
use super::types::{Envelope, FileUpload, Page};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::router::{Location, Navigator};
use crate::state::session::SessionStore;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please check your connection";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";
/// Shown when a failed response carries no usable message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";
pub const LOGIN_PATH: &str = "/login";

pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClient {
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { config, transport, session, notifier, navigator }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Build a request for an endpoint path relative to the base URL.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.config.endpoint(path))
    }

    /// Send through both interceptors.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure after it has been surfaced.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.authorize(&mut request);
        let method = request.method.clone();
        let url = request.url.clone();
        let result = self.transport.send(request).await;
        if let Ok(response) = &result {
            tracing::debug!(%method, %url, status = response.status, "api response");
        }
        self.intercept(result)
    }

    fn authorize(&self, request: &mut HttpRequest) {
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        if let Some(token) = self.session.access_token() {
            request
                .headers
                .push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
    }

    fn intercept(&self, result: Result<HttpResponse, TransportError>) -> Result<HttpResponse, ApiError> {
        let response = match result {
            Ok(response) => response,
            Err(TransportError::Build(reason)) => {
                tracing::warn!(%reason, "api request could not be built");
                self.notifier.error(&format!("Invalid request: {reason}"));
                return Err(ApiError::InvalidRequest(reason));
            }
            Err(e) => {
                tracing::warn!(error = %e, "api request got no response");
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(ApiError::Network(e.to_string()));
            }
        };

        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 {
            self.expire_session();
            return Err(ApiError::AuthExpired);
        }

        let body = serde_json::from_slice::<Value>(&response.body).ok();
        let message = extract_error_message(body.as_ref());
        let code = body.as_ref().and_then(extract_error_code);
        tracing::warn!(status = response.status, %message, "api request rejected");
        self.notifier.error(&message);
        Err(ApiError::Rejected { status: response.status, code, message })
    }

    fn expire_session(&self) {
        tracing::info!("access token rejected, clearing session");
        self.session.clear();
        self.notifier.error(SESSION_EXPIRED_MESSAGE);
        self.navigator.navigate(Location::new(LOGIN_PATH));
    }

    /// Send and decode the response envelope.
    ///
    /// # Errors
    ///
    /// Returns interceptor failures, or `Decode` if the body is not an envelope.
    pub async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Envelope<T>, ApiError> {
        let response = self.send(request).await?;
        response
            .json::<Envelope<T>>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and ignore whatever a successful response carries.
    ///
    /// # Errors
    ///
    /// Returns interceptor failures.
    pub async fn call_unit(&self, request: HttpRequest) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    /// # Errors
    ///
    /// Returns interceptor or decode failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Vec<(String, String)>) -> Result<Envelope<T>, ApiError> {
        let mut request = self.request(Method::GET, path);
        request.query = query;
        self.call(request).await
    }

    /// # Errors
    ///
    /// Returns interceptor or decode failures.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.json_request(Method::POST, path, body)?;
        self.call(request).await
    }

    /// # Errors
    ///
    /// Returns interceptor or decode failures.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.json_request(Method::PUT, path, body)?;
        self.call(request).await
    }

    /// # Errors
    ///
    /// Returns interceptor failures.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.call_unit(self.request(Method::DELETE, path)).await
    }

    /// Multipart upload of a single file under the `file` field.
    ///
    /// # Errors
    ///
    /// Returns interceptor or decode failures.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, file: FileUpload) -> Result<Envelope<T>, ApiError> {
        let mut request = self.request(Method::POST, path);
        request.body = RequestBody::Multipart { field: "file".to_owned(), file };
        self.call(request).await
    }

    /// Build a JSON request without sending it.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if `body` cannot be represented as JSON.
    pub fn json_request<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("request body: {e}")))?;
        let mut request = self.request(method, path);
        request.body = RequestBody::Json(json);
        Ok(request)
    }
}

/// Pick the human-readable message out of a failed response body.
///
/// Ordered fallback: `error.message`, then top-level `message`, then
/// [`DEFAULT_ERROR_MESSAGE`]. Blank strings count as absent.
#[must_use]
pub fn extract_error_message(body: Option<&Value>) -> String {
    let non_blank = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    };

    body.and_then(|b| non_blank(b.pointer("/error/message")))
        .or_else(|| body.and_then(|b| non_blank(b.get("message"))))
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned())
}

fn extract_error_code(body: &Value) -> Option<String> {
    body.pointer("/error/code")
        .or_else(|| body.get("code"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

/// Unwrap the payload an endpoint promises.
///
/// # Errors
///
/// Returns `MissingData` when the envelope has no `data`.
pub fn require_data<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
    envelope.data.ok_or(ApiError::MissingData)
}

/// Unwrap a list envelope; a missing `pagination` block reads as the default.
///
/// # Errors
///
/// Returns `MissingData` when the envelope has no `data`.
pub fn require_page<T>(envelope: Envelope<Vec<T>>) -> Result<Page<T>, ApiError> {
    let pagination = envelope.pagination.unwrap_or_default();
    let items = require_data(envelope)?;
    Ok(Page { items, pagination })
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
