//! Session-scoped key/value slots.
//!
//! The browse view keeps its resumable state here. A slot lives as long as
//! its store: the memory store for the process, the file store until it is
//! cleared.

use crate::storage::sqlite::acquire_lock;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Named-slot string storage.
pub trait SessionStore: Send + Sync {
    /// Reads a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Slots held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(acquire_lock(&self.slots).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        acquire_lock(&self.slots).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        acquire_lock(&self.slots).remove(key);
        Ok(())
    }
}

/// Slots persisted as one JSON object in a single file.
///
/// Lets a command-line session resume where the previous invocation left
/// off. A missing file is an empty session.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the backing file, dropping every slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file exists and cannot be
    /// removed.
    pub fn clear_all(&self) -> Result<()> {
        let _guard = acquire_lock(&self.lock);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::OperationFailed {
                operation: "clear_session".to_string(),
                cause: e.to_string(),
            }),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_session".to_string(),
                    cause: e.to_string(),
                });
            },
        };

        match serde_json::from_str(&content) {
            Ok(slots) => Ok(slots),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(BTreeMap::new())
            },
        }
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        let write_failed = |e: &dyn std::fmt::Display| Error::OperationFailed {
            operation: "write_session".to_string(),
            cause: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(&e))?;
        }

        let content = serde_json::to_string(slots).map_err(|e| write_failed(&e))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content).map_err(|e| write_failed(&e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| write_failed(&e))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = acquire_lock(&self.lock);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = acquire_lock(&self.lock);
        let mut slots = self.load()?;
        slots.insert(key.to_string(), value.to_string());
        self.save(&slots)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = acquire_lock(&self.lock);
        let mut slots = self.load()?;
        if slots.remove(key).is_some() {
            self.save(&slots)?;
        }
        Ok(())
    }
}
