//! Client-side state: the session, the auth state machine over it, and the
//! articles cache.
//!
//! DESIGN
//! ======
//! Nothing here is ambient. [`session::SessionStore`] is constructed once,
//! wrapped in `Arc`, and handed to the HTTP wrapper, the auth store and the
//! navigation guard by [`crate::client::BlogClient`].

pub mod articles;
pub mod auth;
pub mod session;

pub use articles::ArticlesStore;
pub use auth::{AuthStatus, AuthStore};
pub use session::{Session, SessionStore};
