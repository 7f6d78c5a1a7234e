//! Helpers carried over from the server-rendered pages: field validation
//! and draft autosave.

pub mod drafts;
pub mod validation;

pub use drafts::{DraftStore, draft_key};
pub use validation::{ValidationErrors, is_valid_email};
