//! `/auth/*` endpoints.

use std::sync::Arc;

use serde_json::json;

use crate::error::ApiError;
use crate::net::HttpClient;
use crate::net::http::require_data;
use crate::net::types::{
    AuthResponse, Availability, ChangePasswordRequest, LoginRequest, ProfileUpdate, RefreshedToken, RegisterRequest,
    User, UserPayload,
};

#[derive(Clone)]
pub struct AuthApi {
    http: Arc<HttpClient>,
}

impl AuthApi {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        require_data(self.http.post("/auth/login", credentials).await?)
    }

    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        require_data(self.http.post("/auth/register", data).await?)
    }

    /// `GET /auth/me`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn me(&self) -> Result<User, ApiError> {
        let payload: UserPayload = require_data(self.http.get("/auth/me", Vec::new()).await?)?;
        Ok(payload.user)
    }

    /// `POST /auth/refresh`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, ApiError> {
        let body = json!({ "refresh_token": refresh_token });
        require_data(self.http.post("/auth/refresh", &body).await?)
    }

    /// `POST /auth/logout`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.http.json_request(reqwest::Method::POST, "/auth/logout", &json!({}))?;
        self.http.call_unit(request).await
    }

    /// `POST /auth/change-password`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn change_password(&self, data: &ChangePasswordRequest) -> Result<(), ApiError> {
        let request = self.http.json_request(reqwest::Method::POST, "/auth/change-password", data)?;
        self.http.call_unit(request).await
    }

    /// `POST /auth/check-username`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        let availability: Availability =
            require_data(self.http.post("/auth/check-username", &json!({ "username": username })).await?)?;
        Ok(availability.available)
    }

    /// `POST /auth/check-email`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn check_email(&self, email: &str) -> Result<bool, ApiError> {
        let availability: Availability =
            require_data(self.http.post("/auth/check-email", &json!({ "email": email })).await?)?;
        Ok(availability.available)
    }

    /// `PUT /auth/profile`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let payload: UserPayload = require_data(self.http.put("/auth/profile", update).await?)?;
        Ok(payload.user)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
