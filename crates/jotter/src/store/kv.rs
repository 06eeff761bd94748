//! The string-keyed storage medium beneath the note list.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// A synchronous, string-keyed, string-valued store.
///
/// Each `set` replaces the whole value for a key atomically from the
/// caller's point of view. Implementations must be shareable across the
/// refresh task and user actions.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// An in-process [`KeyValueStore`], lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries()?.remove(key).is_some())
    }
}
