//! Articles list cache and current detail entity.
//!
//! Mutations are applied optimistically from the server's response without
//! a follow-up fetch. The last local write wins; changes made elsewhere are
//! only seen on the next fetch.

use crate::api::ArticlesApi;
use crate::error::ApiError;
use crate::net::types::{
    Article, ArticleListParams, ArticlePatch, CreateArticleRequest, LikeResult, PageParams, Pagination,
};

/// Holds the loading flag for the duration of one fetch or mutation.
struct Loading<'a>(&'a mut bool);

impl<'a> Loading<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct ArticlesStore {
    api: ArticlesApi,
    pub articles: Vec<Article>,
    pub current: Option<Article>,
    pub pagination: Pagination,
    pub loading: bool,
}

impl ArticlesStore {
    #[must_use]
    pub fn new(api: ArticlesApi) -> Self {
        Self { api, articles: Vec::new(), current: None, pagination: Pagination::default(), loading: false }
    }

    /// Replace the cached list and pagination with one page.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure; the cache is unchanged.
    pub async fn fetch_articles(&mut self, params: &ArticleListParams) -> Result<Pagination, ApiError> {
        let _loading = Loading::start(&mut self.loading);
        let page = self.api.list(params).await?;
        self.articles = page.items;
        self.pagination = page.pagination;
        Ok(self.pagination)
    }

    /// Like [`Self::fetch_articles`] for a keyword search.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure; the cache is unchanged.
    pub async fn search_articles(&mut self, query: &str, params: PageParams) -> Result<Pagination, ApiError> {
        let _loading = Loading::start(&mut self.loading);
        let page = self.api.search(query, params).await?;
        self.articles = page.items;
        self.pagination = page.pagination;
        Ok(self.pagination)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn fetch_article(&mut self, id: i64) -> Result<Article, ApiError> {
        let _loading = Loading::start(&mut self.loading);
        let article = self.api.get(id).await?;
        self.current = Some(article.clone());
        Ok(article)
    }

    /// Create and prepend to the cached list.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn create_article(&mut self, data: &CreateArticleRequest) -> Result<Article, ApiError> {
        let _loading = Loading::start(&mut self.loading);
        let article = self.api.create(data).await?;
        self.articles.insert(0, article.clone());
        Ok(article)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn update_article(&mut self, id: i64, patch: &ArticlePatch) -> Result<Article, ApiError> {
        let _loading = Loading::start(&mut self.loading);
        let article = self.api.update(id, patch).await?;
        if let Some(slot) = self.articles.iter_mut().find(|a| a.id == id) {
            *slot = article.clone();
        }
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = Some(article.clone());
        }
        Ok(article)
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure; nothing is removed.
    pub async fn delete_article(&mut self, id: i64) -> Result<(), ApiError> {
        let _loading = Loading::start(&mut self.loading);
        self.api.delete(id).await?;
        self.articles.retain(|a| a.id != id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
        Ok(())
    }

    /// Toggle the like; only `likes` changes on the cached copies.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn like_article(&mut self, id: i64) -> Result<LikeResult, ApiError> {
        let result = self.api.like(id).await?;
        let cached = self.articles.iter_mut().chain(self.current.as_mut());
        for article in cached.filter(|a| a.id == id) {
            article.likes = result.likes_count;
        }
        Ok(result)
    }

    pub fn clear_current_article(&mut self) {
        self.current = None;
    }

    pub fn published_articles(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter().filter(|a| a.is_published)
    }

    pub fn draft_articles(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter().filter(|a| !a.is_published)
    }
}

#[cfg(test)]
#[path = "articles_test.rs"]
mod tests;
