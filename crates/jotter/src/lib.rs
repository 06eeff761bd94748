//! `jotter` - a small persistent note list
//!
//! Notes live as one serialized list under a single key of a string-keyed
//! store. A [`NoteListController`] renders that list into whatever surface
//! the host provides, routes create/edit/delete actions back to the
//! [`NoteStore`], and can re-render on a timer to follow changes made by
//! other processes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod note;
pub mod refresh;
pub mod store;
pub mod surface;
pub mod terminal;

pub use config::Config;
pub use controller::{ActionOutcome, ControllerState, ListOptions, NoteListController};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{Note, NoteId};
pub use refresh::RefreshHandle;
pub use store::{KeyValueStore, MemoryKvStore, NoteStore, SqliteKvStore};
pub use surface::{Host, Mode, NoteWidget, Notice, Notifier};
