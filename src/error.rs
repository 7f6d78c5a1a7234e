//! Error taxonomy shared by the HTTP wrapper, endpoint modules and stores.
//!
//! ERROR HANDLING
//! ==============
//! Failures are reported once, at the point of first detection. The HTTP
//! wrapper notifies the user for `Network` and `Rejected` before returning
//! them, so callers only decide whether to react locally. `AuthExpired` is
//! terminal: by the time a caller sees it the session is already cleared and
//! the login redirect has been issued.

use crate::forms::validation::ValidationErrors;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken transport).
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built on this side; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered 401. The session has been torn down.
    #[error("session expired")]
    AuthExpired,

    /// Any other non-2xx response, with the server-supplied message.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, code: Option<String>, message: String },

    /// Client-side field checks failed before anything was sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A 2xx envelope did not carry the payload the endpoint promises.
    #[error("response envelope missing data")]
    MissingData,

    /// A response body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A token refresh was requested with no stored refresh token.
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::AuthExpired => "E_AUTH_EXPIRED",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Validation(_) => "E_VALIDATION",
            Self::MissingData => "E_MISSING_DATA",
            Self::Decode(_) => "E_DECODE",
            Self::MissingRefreshToken => "E_MISSING_REFRESH_TOKEN",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    /// HTTP status for failures that came back from the server.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
