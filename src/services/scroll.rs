//! Scroll state snapshots.

use super::session::SessionStore;
use crate::models::{ClientRecord, SearchCriteria};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Slot name used for the browse view's snapshot.
pub const SCROLL_SLOT: &str = "clientsScrollState";

/// Everything needed to redisplay the browse view without reloading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollSnapshot {
    /// Records loaded so far, in display order.
    pub records: Vec<ClientRecord>,
    /// Index of the last loaded page.
    pub page_index: usize,
    /// Whether another page can be loaded.
    pub has_more: bool,
    /// Criteria the records were loaded with.
    pub criteria: SearchCriteria,
    /// Size of the full result set.
    pub total: usize,
    /// Vertical scroll position.
    pub scroll_offset: f64,
}

/// Single-slot snapshot cache over a [`SessionStore`].
///
/// Constructed once per session and handed to whoever needs it.
pub struct ScrollStateCache {
    store: Arc<dyn SessionStore>,
    slot: String,
}

impl ScrollStateCache {
    /// Creates a cache using the default slot.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_slot(store, SCROLL_SLOT)
    }

    /// Creates a cache using a named slot.
    #[must_use]
    pub fn with_slot(store: Arc<dyn SessionStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    /// Stores a snapshot, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    pub fn save(&self, snapshot: &ScrollSnapshot) -> Result<()> {
        let encoded = serde_json::to_string(snapshot).map_err(|e| Error::OperationFailed {
            operation: "encode_scroll_snapshot".to_string(),
            cause: e.to_string(),
        })?;
        self.store.set(&self.slot, &encoded)?;
        tracing::trace!(
            records = snapshot.records.len(),
            page_index = snapshot.page_index,
            offset = snapshot.scroll_offset,
            "scroll snapshot saved"
        );
        Ok(())
    }

    /// Returns the stored snapshot. An unreadable slot counts as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub fn restore(&self) -> Result<Option<ScrollSnapshot>> {
        let Some(raw) = self.store.get(&self.slot)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "ignoring corrupt scroll snapshot");
                Ok(None)
            },
        }
    }

    /// Drops the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.slot)
    }
}
