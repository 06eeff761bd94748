//! Keeps a host's displayed note list in step with the store.
//!
//! The controller renders the whole list on every pass: it drops every
//! widget and rebuilds one per persisted note. User actions (create, commit
//! an edit, delete) go to the store and are followed by a full render. With
//! auto refresh enabled, a timer renders periodically so changes made by
//! other processes show up without user action.
//!
//! Widgets address notes by [`NoteId`], so an action issued against a note
//! that another writer has since moved still hits the right note, and one
//! issued against a vanished note becomes a logged no-op.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::note::{list_digest, NoteId};
use crate::refresh::{self, RefreshHandle};
use crate::store::NoteStore;
use crate::surface::{Controls, Host, Mode, NoteWidget, Notice, Notifier};

/// Format of the "last updated" time, e.g. `9/10/2024, 3:45:27 PM`.
const STATUS_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, nothing rendered yet.
    Uninitialized,
    /// Initialized; renders replace the displayed list.
    Ready,
}

/// What a user action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The store was changed and the list re-rendered.
    Applied,
    /// Blank input; the user was notified and nothing was stored.
    Rejected,
    /// The target note no longer exists; the list was re-rendered.
    Stale,
}

/// Display behaviour of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Editable or read-only.
    pub mode: Mode,
    /// Re-render on a timer.
    pub auto_refresh: bool,
    /// Timer period.
    pub refresh_interval: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Editable,
            auto_refresh: false,
            refresh_interval: Duration::from_millis(2000),
        }
    }
}

impl ListOptions {
    /// Options for a display-only list that follows external changes.
    #[must_use]
    pub fn read_only(refresh_interval: Duration) -> Self {
        Self {
            mode: Mode::ReadOnly,
            auto_refresh: true,
            refresh_interval,
        }
    }

    /// Options taken from the `[list]` section of the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.list.mode,
            auto_refresh: config.list.auto_refresh,
            refresh_interval: config.refresh_interval(),
        }
    }
}

/// Render the status line text for a sync at `at`.
#[must_use]
pub fn status_text(at: DateTime<Local>) -> String {
    format!("Last updated at: {}", at.format(STATUS_TIME_FORMAT))
}

#[derive(Debug)]
struct Inner {
    store: NoteStore,
    host: Host,
    options: ListOptions,
    state: ControllerState,
    widgets: Vec<NoteWidget>,
    last_digest: Option<String>,
    last_synced: Option<DateTime<Local>>,
}

/// Shared handle to one displayed note list.
///
/// Clones drive the same list. Actions are serialized: each one holds the
/// controller for its whole read-modify-render cycle. Notices are shown
/// after the controller is released, so a notifier may call back into it.
#[derive(Debug, Clone)]
pub struct NoteListController {
    inner: Arc<Mutex<Inner>>,
    notifier: Arc<dyn Notifier>,
}

impl NoteListController {
    /// Build a controller.
    ///
    /// `notifier` receives every notice for actions taken through the
    /// controller. Any notifier already attached to `store` is detached.
    #[must_use]
    pub fn new(
        store: NoteStore,
        host: Host,
        options: ListOptions,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store: store.without_notifier(),
                host,
                options,
                state: ControllerState::Uninitialized,
                widgets: Vec::new(),
                last_digest: None,
                last_synced: None,
            })),
            notifier,
        }
    }

    /// Render for the first time and arm auto refresh if configured.
    ///
    /// Returns the refresh handle when a timer was armed. Dropping the
    /// handle stops the timer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] once a call has succeeded,
    /// [`Error::NoRuntime`] if auto refresh is enabled outside a tokio
    /// runtime, or any error from the first render. After a failed call the
    /// controller stays uninitialized and may be initialized again.
    pub fn initialize(&self) -> Result<Option<RefreshHandle>> {
        let options = {
            let mut inner = self.lock()?;
            if inner.state == ControllerState::Ready {
                return Err(Error::AlreadyInitialized);
            }
            if inner.options.auto_refresh && tokio::runtime::Handle::try_current().is_err() {
                return Err(Error::NoRuntime);
            }
            if inner.options.mode == Mode::ReadOnly && !inner.options.auto_refresh {
                warn!("Read-only note list without auto refresh will not follow external changes");
            }

            inner.render()?;
            inner.state = ControllerState::Ready;
            inner.options
        };

        info!(
            "Note list ready ({} mode, auto refresh {})",
            options.mode,
            if options.auto_refresh { "on" } else { "off" }
        );

        if options.auto_refresh {
            let handle = refresh::spawn(self.clone(), options.refresh_interval)?;
            Ok(Some(handle))
        } else {
            Ok(None)
        }
    }

    /// Rebuild the displayed list from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if a host surface cannot be written.
    pub fn render(&self) -> Result<()> {
        self.lock()?.render()
    }

    /// Store the input text as a new note.
    ///
    /// Blank input (after trimming) is rejected with a notice and stores
    /// nothing. Otherwise the trimmed text is appended, the input cleared
    /// and the list re-rendered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in read-only mode, a surface error if no
    /// input field is attached, or any store or render error.
    pub fn handle_create(&self) -> Result<ActionOutcome> {
        let (outcome, notice) = self.lock()?.create()?;
        self.announce(notice);
        Ok(outcome)
    }

    /// Change the displayed text of a widget without storing it.
    ///
    /// Marks the widget modified. Returns `false` if no widget shows `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn edit_widget(&self, id: NoteId, text: impl Into<String>) -> Result<bool> {
        let mut inner = self.lock()?;
        let Some(widget) = inner.widgets.iter_mut().find(|w| w.id == id) else {
            return Ok(false);
        };
        widget.text = text.into();
        widget.modified = true;
        Ok(true)
    }

    /// Store a widget's current text over its note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in read-only mode, or any store or render
    /// error other than a vanished target.
    pub fn commit_edit(&self, id: NoteId) -> Result<ActionOutcome> {
        let (outcome, notice) = self.lock()?.commit(id)?;
        self.announce(notice);
        Ok(outcome)
    }

    /// Remove a note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in read-only mode, or any store or render
    /// error other than a vanished target.
    pub fn delete(&self, id: NoteId) -> Result<ActionOutcome> {
        let mut inner = self.lock()?;
        inner.ensure_editable()?;

        let result = inner.store.delete(id).map(|_| ());
        inner.finish(result)
    }

    /// Snapshot of the displayed widgets, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn widgets(&self) -> Result<Vec<NoteWidget>> {
        Ok(self.lock()?.widgets.clone())
    }

    /// The widget displayed at `index`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn widget_at(&self, index: usize) -> Result<Option<NoteWidget>> {
        Ok(self.lock()?.widgets.get(index).cloned())
    }

    /// Current lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn state(&self) -> Result<ControllerState> {
        Ok(self.lock()?.state)
    }

    /// The display mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn mode(&self) -> Result<Mode> {
        Ok(self.lock()?.options.mode)
    }

    /// Digest of the list as of the last render.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn last_digest(&self) -> Result<Option<String>> {
        Ok(self.lock()?.last_digest.clone())
    }

    /// When the last render happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn last_synced(&self) -> Result<Option<DateTime<Local>>> {
        Ok(self.lock()?.last_synced)
    }

    /// The store this controller reads and writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller lock is poisoned.
    pub fn store(&self) -> Result<NoteStore> {
        Ok(self.lock()?.store.clone())
    }

    fn announce(&self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            self.notifier.notify(notice);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::internal("note list controller lock poisoned"))
    }
}

impl Inner {
    fn ensure_editable(&self) -> Result<()> {
        match self.options.mode {
            Mode::Editable => Ok(()),
            Mode::ReadOnly => Err(Error::ReadOnly),
        }
    }

    fn create(&mut self) -> Result<(ActionOutcome, Option<Notice>)> {
        self.ensure_editable()?;

        let raw = self
            .host
            .input
            .as_ref()
            .ok_or_else(|| Error::surface("no input field attached"))?
            .value();
        let content = raw.trim();
        if content.is_empty() {
            return Ok((ActionOutcome::Rejected, Some(Notice::EmptyCreate)));
        }

        let note = self.store.append(content)?;
        debug!("Created note {}", note.id);
        if let Some(input) = self.host.input.as_mut() {
            input.clear();
        }
        self.render()?;
        Ok((ActionOutcome::Applied, Some(Notice::Created)))
    }

    fn commit(&mut self, id: NoteId) -> Result<(ActionOutcome, Option<Notice>)> {
        self.ensure_editable()?;

        let text = self
            .widgets
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.text.trim().to_string());
        let Some(content) = text else {
            warn!("Commit for note {} ignored: not displayed", id);
            self.render()?;
            return Ok((ActionOutcome::Stale, None));
        };
        if content.is_empty() {
            return Ok((ActionOutcome::Rejected, Some(Notice::EmptyEdit)));
        }

        let result = self.store.replace(id, content).map(|_| ());
        let outcome = self.finish(result)?;
        let notice = (outcome == ActionOutcome::Applied).then_some(Notice::Updated);
        Ok((outcome, notice))
    }

    /// Re-render after a store mutation, absorbing a vanished target.
    fn finish(&mut self, result: Result<()>) -> Result<ActionOutcome> {
        let outcome = match result {
            Ok(()) => ActionOutcome::Applied,
            Err(e) if e.is_stale_target() => ActionOutcome::Stale,
            Err(e) => return Err(e),
        };
        self.render()?;
        Ok(outcome)
    }

    fn render(&mut self) -> Result<()> {
        let notes = self.store.list_all();
        let digest = list_digest(&notes);
        if let Some(previous) = &self.last_digest {
            if *previous != digest {
                debug!("Note list changed since last render ({} notes)", notes.len());
            }
        }

        let controls = match self.options.mode {
            Mode::Editable => Controls::Editable,
            Mode::ReadOnly => Controls::Hidden,
        };

        self.host.list.clear()?;
        self.widgets.clear();
        for (index, note) in notes.into_iter().enumerate() {
            let widget = NoteWidget {
                id: note.id,
                index,
                text: note.content,
                modified: false,
                controls,
            };
            self.host.list.append(&widget)?;
            self.widgets.push(widget);
        }
        self.last_digest = Some(digest);

        let now = Local::now();
        self.last_synced = Some(now);
        if let Some(status) = self.host.status.as_mut() {
            status.set_text(&status_text(now))?;
        }
        Ok(())
    }
}
