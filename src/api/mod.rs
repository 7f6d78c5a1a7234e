//! Typed endpoint modules. Each call forwards its parameters, unwraps the
//! envelope, and returns the payload or the failure the HTTP wrapper has
//! already surfaced. Nothing here validates input.

pub mod articles;
pub mod auth;
pub mod comments;
pub mod upload;

pub use articles::ArticlesApi;
pub use auth::AuthApi;
pub use comments::CommentsApi;
pub use upload::UploadApi;
