//! `/comments/*` endpoints.

use std::sync::Arc;

use crate::error::ApiError;
use crate::net::HttpClient;
use crate::net::http::{require_data, require_page};
use crate::net::types::{Comment, CommentListParams, CommentPayload, CreateCommentRequest, Page, UpdateCommentRequest};

#[derive(Clone)]
pub struct CommentsApi {
    http: Arc<HttpClient>,
}

impl CommentsApi {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn list(&self, params: &CommentListParams) -> Result<Page<Comment>, ApiError> {
        require_page(self.http.get("/comments", params.to_query()).await?)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn get(&self, id: i64) -> Result<Comment, ApiError> {
        let payload: CommentPayload = require_data(self.http.get(&format!("/comments/{id}"), Vec::new()).await?)?;
        Ok(payload.comment)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn create(&self, data: &CreateCommentRequest) -> Result<Comment, ApiError> {
        let payload: CommentPayload = require_data(self.http.post("/comments", data).await?)?;
        Ok(payload.comment)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn update(&self, id: i64, data: &UpdateCommentRequest) -> Result<Comment, ApiError> {
        let payload: CommentPayload = require_data(self.http.put(&format!("/comments/{id}"), data).await?)?;
        Ok(payload.comment)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&format!("/comments/{id}")).await
    }
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;
