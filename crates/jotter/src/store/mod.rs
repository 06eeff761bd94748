//! Note persistence.
//!
//! A [`NoteStore`] keeps the whole note list as one JSON blob under a single
//! key of a [`KeyValueStore`]. Every operation reads and writes the entire
//! list; there is no cache and no partial update.
//!
//! The blob is a JSON array. Entries written by jotter are objects carrying
//! an id and the content. Bare strings are also accepted; they get ids
//! derived from their content, which the next write persists.

pub mod kv;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

pub use kv::{KeyValueStore, MemoryKvStore};
pub use sqlite::{KvStats, SqliteKvStore};

use crate::error::{Error, Result};
use crate::note::{Note, NoteId};
use crate::surface::{Notice, Notifier};

/// Key used when none is configured.
pub const DEFAULT_KEY: &str = "notes";

/// One persisted entry, in either accepted shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Keyed(Note),
    Plain(String),
}

/// Parse a persisted blob.
///
/// Returns `None` when the blob is not a list of notes or strings. A JSON
/// `null` is an empty list.
#[must_use]
pub fn decode(raw: &str) -> Option<Vec<Note>> {
    let entries: Option<Vec<StoredEntry>> = serde_json::from_str(raw).ok()?;
    let entries = entries.unwrap_or_default();

    let mut seen: HashMap<String, usize> = HashMap::new();
    let notes = entries
        .into_iter()
        .map(|entry| match entry {
            StoredEntry::Keyed(note) => note,
            StoredEntry::Plain(content) => {
                let ordinal = seen.entry(content.clone()).or_insert(0);
                let id = NoteId::derived(&content, *ordinal);
                *ordinal += 1;
                Note { id, content }
            }
        })
        .collect();
    Some(notes)
}

/// Serialize a note list for persistence.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string(notes)?)
}

/// Handle to one persisted note list.
///
/// Cheap to clone; clones address the same key of the same store.
#[derive(Debug, Clone)]
pub struct NoteStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    notifier: Option<Arc<dyn Notifier>>,
}

impl NoteStore {
    /// Create a store for the list kept under `key`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            notifier: None,
        }
    }

    /// Create a store backed by a fresh [`MemoryKvStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()), DEFAULT_KEY)
    }

    /// Report successful creates and updates through `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Stop reporting creates and updates.
    #[must_use]
    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    /// The key this list is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Every note, in list order.
    ///
    /// Never fails: a missing key, an unreadable store or a malformed blob
    /// all yield an empty list.
    #[must_use]
    pub fn list_all(&self) -> Vec<Note> {
        match self.load() {
            Ok(notes) => notes,
            Err(e) => {
                warn!("Failed to read notes under key {}: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// The content of every note, in list order.
    #[must_use]
    pub fn contents(&self) -> Vec<String> {
        self.list_all().into_iter().map(|n| n.content).collect()
    }

    /// Number of notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list_all().len()
    }

    /// Check if there are no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a note by id.
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<Note> {
        self.list_all().into_iter().find(|n| n.id == id)
    }

    /// Current position of a note, if it still exists.
    #[must_use]
    pub fn position_of(&self, id: NoteId) -> Option<usize> {
        self.list_all().iter().position(|n| n.id == id)
    }

    /// Add a note at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    pub fn append(&self, content: impl Into<String>) -> Result<Note> {
        let note = Note::new(content);
        let mut notes = self.load()?;
        notes.push(note.clone());
        self.save(&notes)?;

        debug!("Appended note {} at index {}", note.id, notes.len() - 1);
        self.notify(Notice::Created);
        Ok(note)
    }

    /// Overwrite the content of the note at `index`, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] without writing if `index` is not
    /// in the list, or an error if the list cannot be written.
    pub fn replace_at(&self, index: usize, content: impl Into<String>) -> Result<Note> {
        let mut notes = self.load()?;
        let len = notes.len();
        let Some(slot) = notes.get_mut(index) else {
            warn!("Replace at index {} ignored: list has {} notes", index, len);
            return Err(Error::IndexOutOfRange { index, len });
        };
        slot.content = content.into();
        let note = slot.clone();
        self.save(&notes)?;

        debug!("Replaced note {} at index {}", note.id, index);
        self.notify(Notice::Updated);
        Ok(note)
    }

    /// Remove the note at `index`; later notes move up by one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] without writing if `index` is not
    /// in the list, or an error if the list cannot be written.
    pub fn delete_at(&self, index: usize) -> Result<Note> {
        let mut notes = self.load()?;
        if index >= notes.len() {
            warn!(
                "Delete at index {} ignored: list has {} notes",
                index,
                notes.len()
            );
            return Err(Error::IndexOutOfRange {
                index,
                len: notes.len(),
            });
        }
        let removed = notes.remove(index);
        self.save(&notes)?;

        debug!("Deleted note {} from index {}", removed.id, index);
        Ok(removed)
    }

    /// Overwrite the content of the note with `id`.
    ///
    /// Returns the note's position at the time of the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] without writing if no such note
    /// exists, or an error if the list cannot be written.
    pub fn replace(&self, id: NoteId, content: impl Into<String>) -> Result<usize> {
        let mut notes = self.load()?;
        let Some(index) = notes.iter().position(|n| n.id == id) else {
            warn!("Replace of note {} ignored: no longer present", id);
            return Err(Error::NoteNotFound { id });
        };
        notes[index].content = content.into();
        self.save(&notes)?;

        debug!("Replaced note {} at index {}", id, index);
        self.notify(Notice::Updated);
        Ok(index)
    }

    /// Remove the note with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] without writing if no such note
    /// exists, or an error if the list cannot be written.
    pub fn delete(&self, id: NoteId) -> Result<Note> {
        let mut notes = self.load()?;
        let Some(index) = notes.iter().position(|n| n.id == id) else {
            warn!("Delete of note {} ignored: no longer present", id);
            return Err(Error::NoteNotFound { id });
        };
        let removed = notes.remove(index);
        self.save(&notes)?;

        debug!("Deleted note {} from index {}", id, index);
        Ok(removed)
    }

    /// Drop the whole list. Returns `true` if anything was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        self.kv.remove(&self.key)
    }

    /// Read the list for a read-modify-write.
    ///
    /// Malformed data reads as empty; I/O failures propagate so a mutation
    /// never overwrites a list it could not read.
    fn load(&self) -> Result<Vec<Note>> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };
        Ok(decode(&raw).unwrap_or_else(|| {
            warn!(
                "Persisted notes under key {} are malformed; treating as empty",
                self.key
            );
            Vec::new()
        }))
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        self.kv.set(&self.key, &encode(notes)?)
    }

    fn notify(&self, notice: Notice) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(notice);
        }
    }
}
