//! # blog-client
//!
//! Client library for the blog CMS REST API (`/api/v1`).
//!
//! The crate owns the client-side authentication lifecycle: the session and
//! its durable copy, bearer-token attachment, uniform failure handling for
//! every response, and the navigation guard that gates authenticated views.
//! On top of that sit thin typed endpoint modules, the articles list cache,
//! and the legacy form helpers (validation and draft autosave).
//!
//! [`client::BlogClient`] wires everything together with explicitly injected
//! storage, notification and navigation handles.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod net;
pub mod notify;
pub mod router;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::BlogClient;
pub use config::ClientConfig;
pub use error::ApiError;
