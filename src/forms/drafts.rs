//! Form drafts kept in client storage under `draft_<formId>`.
//!
//! A draft is a flat JSON object of field name to value. Autosave runs on a
//! background task and overwrites the draft on every tick; a failed write is
//! logged and retried on the next tick.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::storage::{KeyValueStore, StorageError};

pub const DRAFT_KEY_PREFIX: &str = "draft_";
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

pub type Draft = BTreeMap<String, String>;

#[must_use]
pub fn draft_key(form_id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}{form_id}")
}

#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// # Errors
    ///
    /// Returns the storage failure if the draft could not be written.
    pub fn save(&self, form_id: &str, draft: &Draft) -> Result<(), StorageError> {
        let raw = serde_json::to_string(draft).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.storage.set(&draft_key(form_id), &raw)
    }

    /// The saved draft, if one exists and parses. A corrupt entry is
    /// logged and reported as absent.
    #[must_use]
    pub fn restore(&self, form_id: &str) -> Option<Draft> {
        let raw = self.storage.get(&draft_key(form_id))?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!(form_id, error = %e, "discarding unreadable draft");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns the storage failure if the key could not be removed.
    pub fn clear(&self, form_id: &str) -> Result<(), StorageError> {
        self.storage.remove(&draft_key(form_id))
    }

    /// Form ids that currently have a stored draft.
    #[must_use]
    pub fn form_ids(&self) -> Vec<String> {
        self.storage
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(DRAFT_KEY_PREFIX).map(ToOwned::to_owned))
            .collect()
    }

    /// Save `snapshot()` every `period` until the handle is aborted. The
    /// first save happens one full period after the call.
    pub fn spawn_autosave<F>(&self, form_id: impl Into<String>, period: Duration, snapshot: F) -> JoinHandle<()>
    where
        F: Fn() -> Draft + Send + 'static,
    {
        let store = self.clone();
        let form_id = form_id.into();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                let draft = snapshot();
                match store.save(&form_id, &draft) {
                    Ok(()) => tracing::debug!(form_id = %form_id, fields = draft.len(), "draft autosaved"),
                    Err(e) => tracing::warn!(form_id = %form_id, error = %e, "draft autosave failed"),
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "drafts_test.rs"]
mod tests;
