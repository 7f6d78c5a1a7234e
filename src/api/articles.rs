//! `/articles/*` endpoints.

use std::sync::Arc;

use serde_json::json;

use crate::error::ApiError;
use crate::net::HttpClient;
use crate::net::http::{require_data, require_page};
use crate::net::types::{
    Article, ArticleListParams, ArticlePatch, ArticlePayload, CreateArticleRequest, LikeResult, Page, PageParams,
    push_param,
};

#[derive(Clone)]
pub struct ArticlesApi {
    http: Arc<HttpClient>,
}

impl ArticlesApi {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// `GET /articles`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn list(&self, params: &ArticleListParams) -> Result<Page<Article>, ApiError> {
        require_page(self.http.get("/articles", params.to_query()).await?)
    }

    /// `GET /articles/{id}`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn get(&self, id: i64) -> Result<Article, ApiError> {
        let payload: ArticlePayload = require_data(self.http.get(&format!("/articles/{id}"), Vec::new()).await?)?;
        Ok(payload.article)
    }

    /// `POST /articles`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn create(&self, data: &CreateArticleRequest) -> Result<Article, ApiError> {
        let payload: ArticlePayload = require_data(self.http.post("/articles", data).await?)?;
        Ok(payload.article)
    }

    /// `PUT /articles/{id}`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn update(&self, id: i64, patch: &ArticlePatch) -> Result<Article, ApiError> {
        let payload: ArticlePayload = require_data(self.http.put(&format!("/articles/{id}"), patch).await?)?;
        Ok(payload.article)
    }

    /// `DELETE /articles/{id}`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&format!("/articles/{id}")).await
    }

    /// `POST /articles/{id}/like`, toggling the caller's like.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn like(&self, id: i64) -> Result<LikeResult, ApiError> {
        require_data(self.http.post(&format!("/articles/{id}/like"), &json!({})).await?)
    }

    /// `GET /articles/search?q=`
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn search(&self, query: &str, params: PageParams) -> Result<Page<Article>, ApiError> {
        let mut pairs = vec![("q".to_owned(), query.to_owned())];
        push_param(&mut pairs, "page", params.page);
        push_param(&mut pairs, "per_page", params.per_page);
        require_page(self.http.get("/articles/search", pairs).await?)
    }
}

#[cfg(test)]
#[path = "articles_test.rs"]
mod tests;
