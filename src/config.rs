//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api/v1";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SESSION_DIR: &str = ".blog-client";
pub const DEFAULT_SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root every endpoint path is appended to, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Location of the durable session file used by file-backed storage.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build a config for `base_url` with default timeout and session file.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            session_file: default_session_file(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BLOG_API_BASE_URL`: default `http://127.0.0.1:5000/api/v1`
    /// - `BLOG_API_TIMEOUT_MS`: default 10000
    /// - `BLOG_SESSION_FILE`: default `$HOME/.blog-client/session.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or timeout cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_base = std::env::var("BLOG_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        let base_url = normalize_base_url(&raw_base)?;

        let timeout_ms = match std::env::var("BLOG_API_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Parse(format!("BLOG_API_TIMEOUT_MS is not a number: {raw}")))?,
            Err(_) => DEFAULT_API_TIMEOUT_MS,
        };

        let session_file = std::env::var("BLOG_SESSION_FILE").map_or_else(|_| default_session_file(), PathBuf::from);

        Ok(Self { base_url, timeout: Duration::from_millis(timeout_ms), session_file })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Join an endpoint path (e.g. `/articles/7`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Scheme, host and port of the API, used to absolutize upload paths.
    #[must_use]
    pub fn origin(&self) -> String {
        Url::parse(&self.base_url).map_or_else(|_| self.base_url.clone(), |url| url.origin().ascii_serialization())
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(ConfigError::UnsupportedScheme(other.to_owned())),
    }
}

fn default_session_file() -> PathBuf {
    let home = std::env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from);
    home.join(DEFAULT_SESSION_DIR).join(DEFAULT_SESSION_FILE_NAME)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
