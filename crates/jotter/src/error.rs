//! Error types for jotter.
//!
//! This module defines all error types used throughout the jotter crate.
//! Malformed persisted data is deliberately absent: the store absorbs it and
//! reports an empty list instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::note::NoteId;

/// The main error type for jotter operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Note Errors ===
    /// A positional operation targeted an index outside the list.
    #[error("index {index} is out of range for {len} notes")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// Length of the list at the time of the request.
        len: usize,
    },

    /// No note with the given id exists.
    #[error("note not found: {id}")]
    NoteNotFound {
        /// The id that was looked up.
        id: NoteId,
    },

    /// No note id starts with the given prefix.
    #[error("no note matches id '{prefix}'")]
    UnknownId {
        /// The prefix that was looked up.
        prefix: String,
    },

    /// More than one note id starts with the given prefix.
    #[error("id '{prefix}' is ambiguous: {count} notes match")]
    AmbiguousId {
        /// The prefix that was looked up.
        prefix: String,
        /// How many ids matched.
        count: usize,
    },

    /// Blank or whitespace-only content was submitted.
    #[error("note content cannot be empty")]
    EmptyInput,

    // === Controller Errors ===
    /// An editing action was attempted on a read-only list.
    #[error("note list is read-only")]
    ReadOnly,

    /// The controller was initialized twice.
    #[error("note list controller is already initialized")]
    AlreadyInitialized,

    /// Auto refresh was requested outside of a tokio runtime.
    #[error("auto refresh requires a running tokio runtime")]
    NoRuntime,

    /// Writing to a host surface failed.
    #[error("surface error: {0}")]
    Surface(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for jotter operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new surface error.
    #[must_use]
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the targeted note has moved or vanished.
    ///
    /// These are recoverable: the caller re-renders and carries on.
    #[must_use]
    pub fn is_stale_target(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::NoteNotFound { .. }
        )
    }
}
