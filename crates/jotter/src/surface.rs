//! Host surface contracts.
//!
//! The controller never draws anything itself. It talks to whatever the host
//! provides through these traits: a text input, a list container, a status
//! line and a blocking notification primitive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::note::NoteId;

/// Whether a list accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Create, edit and delete controls are available.
    #[default]
    Editable,
    /// Display only; relies on auto refresh to follow external changes.
    ReadOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editable => write!(f, "editable"),
            Self::ReadOnly => write!(f, "read_only"),
        }
    }
}

/// Controls attached to a rendered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    /// "Save changes" and "Delete" actions are shown.
    Editable,
    /// No actions; the note is display only.
    Hidden,
}

/// A rendered note as held by the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteWidget {
    /// Id of the note this widget shows.
    pub id: NoteId,
    /// Position in the list at render time.
    pub index: usize,
    /// Current text, possibly edited but not yet committed.
    pub text: String,
    /// Set once the text is edited locally. Cleared by the next render.
    pub modified: bool,
    /// Which actions the widget offers.
    pub controls: Controls,
}

/// A blocking, user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A new note was stored.
    Created,
    /// An existing note was rewritten.
    Updated,
    /// Create was attempted with blank input.
    EmptyCreate,
    /// An edit was committed with blank text.
    EmptyEdit,
}

impl Notice {
    /// The message shown to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "Note saved successfully!",
            Self::Updated => "Note updated successfully!",
            Self::EmptyCreate => "Please write something before saving.",
            Self::EmptyEdit => "Note cannot be empty!",
        }
    }

    /// Check if this notice reports rejected input.
    #[must_use]
    pub fn is_validation(self) -> bool {
        matches!(self, Self::EmptyCreate | Self::EmptyEdit)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Source of new note text.
pub trait InputField: Send + fmt::Debug {
    /// The text currently entered.
    fn value(&self) -> String;

    /// Empty the field.
    fn clear(&mut self);
}

/// Container that receives rendered notes, in order.
pub trait ListSurface: Send + fmt::Debug {
    /// Discard every displayed widget.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be written.
    fn clear(&mut self) -> Result<()>;

    /// Display one more widget after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be written.
    fn append(&mut self, widget: &NoteWidget) -> Result<()>;
}

/// Where the "last updated" text goes.
pub trait StatusLine: Send + fmt::Debug {
    /// Replace the status text.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be written.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Blocking notification primitive.
///
/// `notify` returns once the user has been told. The controller calls it
/// after releasing its lock, so an implementation may query or drive the
/// controller. [`NoteStore`](crate::NoteStore) calls it from inside its
/// write operations.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Show `notice` to the user.
    fn notify(&self, notice: Notice);
}

/// The elements a host hands to the controller.
#[derive(Debug)]
pub struct Host {
    /// Source of new note text. Required for create in editable mode.
    pub input: Option<Box<dyn InputField>>,
    /// Container for rendered notes.
    pub list: Box<dyn ListSurface>,
    /// Optional "last updated" display.
    pub status: Option<Box<dyn StatusLine>>,
}

impl Host {
    /// A host with only a list container.
    #[must_use]
    pub fn new(list: Box<dyn ListSurface>) -> Self {
        Self {
            input: None,
            list,
            status: None,
        }
    }

    /// Attach an input field.
    #[must_use]
    pub fn with_input(mut self, input: Box<dyn InputField>) -> Self {
        self.input = Some(input);
        self
    }

    /// Attach a status line.
    #[must_use]
    pub fn with_status(mut self, status: Box<dyn StatusLine>) -> Self {
        self.status = Some(status);
        self
    }
}
