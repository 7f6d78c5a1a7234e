//! `/upload/*` endpoints and URL resolution for stored files.

use std::sync::Arc;

use crate::error::ApiError;
use crate::forms::validation::UploadKind;
use crate::net::HttpClient;
use crate::net::http::require_data;
use crate::net::types::{FileUpload, UploadPayload, UploadedFile};

#[derive(Clone)]
pub struct UploadApi {
    http: Arc<HttpClient>,
}

impl UploadApi {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// `POST /upload/image`, multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn upload_image(&self, file: FileUpload) -> Result<UploadedFile, ApiError> {
        self.upload(UploadKind::Image, file).await
    }

    /// `POST /upload/file`, multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn upload_file(&self, file: FileUpload) -> Result<UploadedFile, ApiError> {
        self.upload(UploadKind::File, file).await
    }

    /// # Errors
    ///
    /// Returns the surfaced request failure.
    pub async fn upload(&self, kind: UploadKind, file: FileUpload) -> Result<UploadedFile, ApiError> {
        let path = match kind {
            UploadKind::Image => "/upload/image",
            UploadKind::File => "/upload/file",
        };
        tracing::debug!(path, filename = %file.filename, size = file.bytes.len(), "uploading");
        let payload: UploadPayload = require_data(self.http.upload(path, file).await?)?;
        Ok(payload.file)
    }

    /// Absolute URL for a stored file path.
    #[must_use]
    pub fn file_url(&self, path: &str) -> String {
        file_url(&self.http.config().origin(), path)
    }
}

/// Paths already starting with `http` pass through; others are joined onto
/// `origin` with exactly one slash.
#[must_use]
pub fn file_url(origin: &str, path: &str) -> String {
    if path.starts_with("http") {
        return path.to_owned();
    }
    format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
