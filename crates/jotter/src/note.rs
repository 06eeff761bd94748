//! Core note types for jotter.
//!
//! A note is a piece of text plus a stable identifier. Position in the list
//! is only an ordering; updates and deletes address notes by [`NoteId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex characters shown by [`NoteId::short`].
const SHORT_ID_LEN: usize = 8;

/// Domain separator for ids derived from legacy entries.
const LEGACY_ID_CONTEXT: &[u8] = b"jotter legacy note id v1";

/// Stable, opaque identifier of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive the id of an entry persisted without one.
    ///
    /// `ordinal` counts earlier entries with identical content, so that
    /// duplicates get distinct ids and the same blob always yields the
    /// same ids.
    #[must_use]
    pub fn derived(content: &str, ordinal: usize) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(LEGACY_ID_CONTEXT);
        hasher.update(&(ordinal as u64).to_le_bytes());
        hasher.update(content.as_bytes());
        let hash = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash.as_bytes()[..16]);
        Self(Uuid::from_bytes(bytes))
    }

    /// The first few hex characters, for display.
    #[must_use]
    pub fn short(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[..SHORT_ID_LEN].to_string()
    }

    /// Check whether `prefix` abbreviates this id.
    ///
    /// Hyphens are ignored and the comparison is case-insensitive.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let wanted: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable identifier, assigned at creation.
    pub id: NoteId,
    /// The note text.
    pub content: String,
}

impl Note {
    /// Create a note with a fresh id.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            content: content.into(),
        }
    }
}

/// Compute a digest identifying the exact contents and order of a list.
#[must_use]
pub fn list_digest(notes: &[Note]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(notes.len() as u64).to_le_bytes());
    for note in notes {
        hasher.update(note.id.as_uuid().as_bytes());
        hasher.update(&(note.content.len() as u64).to_le_bytes());
        hasher.update(note.content.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
