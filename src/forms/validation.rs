//! Client-side field checks for the blog's forms.
//!
//! Every check runs; a form reports all failing fields at once rather than
//! stopping at the first. Lengths are counted in characters after trimming.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 10;
pub const SUMMARY_MAX: usize = 500;
pub const TAGS_MAX: usize = 200;
pub const COMMENT_MAX: usize = 1000;
pub const SEARCH_MAX: usize = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
pub const FILE_EXTENSIONS: &[&str] = &["txt", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

// =============================================================================
// ERRORS
// =============================================================================

/// Failing fields mapped to their messages, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`; empty if it passed.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// FIELD CHECKS
// =============================================================================

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// `local@domain.tld`: no whitespace, one `@`, and a dot inside the domain.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn required(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
        return false;
    }
    true
}

fn length_between(errors: &mut ValidationErrors, field: &str, value: &str, min: usize, max: usize, label: &str) {
    let len = char_len(value);
    if len < min || len > max {
        errors.add(field, format!("{label} must be between {min} and {max} characters"));
    }
}

fn at_most(errors: &mut ValidationErrors, field: &str, value: &str, max: usize, label: &str) {
    if char_len(value) > max {
        errors.add(field, format!("{label} must be at most {max} characters"));
    }
}

fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if required(errors, field, value, "Email") && !is_valid_email(value.trim()) {
        errors.add(field, "Please enter a valid email address");
    }
}

fn check_new_password(errors: &mut ValidationErrors, field: &str, confirm_field: &str, password: &str, confirm: &str) {
    if required(errors, field, password, "Password") && password.chars().count() < PASSWORD_MIN {
        errors.add(field, format!("Password must be at least {PASSWORD_MIN} characters"));
    }
    if required(errors, confirm_field, confirm, "Password confirmation") && confirm != password {
        errors.add(confirm_field, "Passwords do not match");
    }
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if required(&mut errors, "username", &self.username, "Username") {
            length_between(&mut errors, "username", &self.username, USERNAME_MIN, USERNAME_MAX, "Username");
        }
        required(&mut errors, "password", &self.password, "Password");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if required(&mut errors, "username", &self.username, "Username") {
            length_between(&mut errors, "username", &self.username, USERNAME_MIN, USERNAME_MAX, "Username");
        }
        check_email(&mut errors, "email", &self.email);
        check_new_password(&mut errors, "password", "confirm_password", &self.password, &self.confirm_password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "current_password", &self.current_password, "Current password");
        check_new_password(&mut errors, "new_password", "confirm_password", &self.new_password, &self.confirm_password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    /// Comma-separated tag names as typed.
    pub tags: Option<String>,
}

impl ArticleForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if required(&mut errors, "title", &self.title, "Title") {
            length_between(&mut errors, "title", &self.title, 1, TITLE_MAX, "Title");
        }
        if required(&mut errors, "content", &self.content, "Content") && char_len(&self.content) < CONTENT_MIN {
            errors.add("content", format!("Content must be at least {CONTENT_MIN} characters"));
        }
        if let Some(summary) = &self.summary {
            at_most(&mut errors, "summary", summary, SUMMARY_MAX, "Summary");
        }
        if let Some(tags) = &self.tags {
            at_most(&mut errors, "tags", tags, TAGS_MAX, "Tags");
        }
        errors.into_result()
    }

    /// Split the tags text into trimmed, non-empty names.
    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Check a comment body: 1 to 1000 characters.
///
/// # Errors
///
/// Returns the `content` failure.
pub fn validate_comment(content: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if required(&mut errors, "content", content, "Comment") {
        length_between(&mut errors, "content", content, 1, COMMENT_MAX, "Comment");
    }
    errors.into_result()
}

/// Check a search query: 1 to 100 characters.
///
/// # Errors
///
/// Returns the `query` failure.
pub fn validate_search(query: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if required(&mut errors, "query", query, "Search keyword") {
        length_between(&mut errors, "query", query, 1, SEARCH_MAX, "Search keyword");
    }
    errors.into_result()
}

// =============================================================================
// UPLOADS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    File,
}

impl UploadKind {
    #[must_use]
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::File => FILE_EXTENSIONS,
        }
    }
}

/// Lowercased extension after the last dot, if any.
#[must_use]
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// # Errors
///
/// Returns a `file` failure when the extension is not on the allow-list.
pub fn validate_upload(filename: &str, kind: UploadKind) -> Result<(), ValidationErrors> {
    let allowed = kind.allowed_extensions();
    let ok = file_extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()));
    if ok {
        return Ok(());
    }
    let mut errors = ValidationErrors::new();
    errors.add("file", format!("Unsupported file type, allowed: {}", allowed.join(", ")));
    Err(errors)
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
