//! Terminal host for the `jot` binary.
//!
//! Notes are printed one per row, prefixed with their position and, when
//! the list is editable, the short id used to address them. Notices go to
//! stderr.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::surface::{Controls, InputField, ListSurface, Notice, Notifier, NoteWidget, StatusLine};

/// ANSI sequence that clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Indent for continuation lines of multi-line notes.
const CONTINUATION_INDENT: &str = "      ";

/// Format one widget as terminal rows.
#[must_use]
pub fn format_widget(widget: &NoteWidget) -> String {
    let mut lines = widget.text.lines();
    let first = lines.next().unwrap_or("");

    let mut out = match widget.controls {
        Controls::Editable => {
            let marker = if widget.modified { "*" } else { " " };
            format!("{:>4}  {}{} {}", widget.index, widget.id.short(), marker, first)
        }
        Controls::Hidden => format!("{:>4}  {}", widget.index, first),
    };

    let indent = match widget.controls {
        Controls::Editable => format!("{CONTINUATION_INDENT}          "),
        Controls::Hidden => CONTINUATION_INDENT.to_string(),
    };
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

/// Writes rendered notes to a terminal stream.
#[derive(Debug)]
pub struct TerminalList<W> {
    out: W,
    clear_screen: bool,
}

impl<W: Write> TerminalList<W> {
    /// Print rows as they come; `clear` does nothing on screen.
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
        }
    }

    /// Clear the screen at the start of each render.
    pub fn redrawing(out: W) -> Self {
        Self {
            out,
            clear_screen: true,
        }
    }
}

impl<W: Write + Send + std::fmt::Debug> ListSurface for TerminalList<W> {
    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            self.out
                .write_all(CLEAR_SCREEN.as_bytes())
                .map_err(|e| Error::surface(e.to_string()))?;
        }
        Ok(())
    }

    fn append(&mut self, widget: &NoteWidget) -> Result<()> {
        writeln!(self.out, "{}", format_widget(widget)).map_err(|e| Error::surface(e.to_string()))?;
        self.out.flush().map_err(|e| Error::surface(e.to_string()))
    }
}

/// Keeps the most recent render for printing later.
///
/// One-shot commands render more than once (before and after the action);
/// only the final state is worth printing.
#[derive(Debug, Clone, Default)]
pub struct SnapshotList {
    rows: Arc<Mutex<Vec<NoteWidget>>>,
}

impl SnapshotList {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The widgets of the latest render.
    #[must_use]
    pub fn rows(&self) -> Vec<NoteWidget> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Print the latest render to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` cannot be written.
    pub fn print_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        for widget in self.rows() {
            writeln!(out, "{}", format_widget(&widget))?;
        }
        Ok(())
    }

    fn rows_mut(&self) -> Result<std::sync::MutexGuard<'_, Vec<NoteWidget>>> {
        self.rows
            .lock()
            .map_err(|_| Error::internal("snapshot lock poisoned"))
    }
}

impl ListSurface for SnapshotList {
    fn clear(&mut self) -> Result<()> {
        self.rows_mut()?.clear();
        Ok(())
    }

    fn append(&mut self, widget: &NoteWidget) -> Result<()> {
        self.rows_mut()?.push(widget.clone());
        Ok(())
    }
}

/// Writes the "last updated" line to a terminal stream.
#[derive(Debug)]
pub struct TerminalStatus<W> {
    out: W,
}

impl<W: Write> TerminalStatus<W> {
    /// Status lines go to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send + std::fmt::Debug> StatusLine for TerminalStatus<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "\n{text}").map_err(|e| Error::surface(e.to_string()))?;
        self.out.flush().map_err(|e| Error::surface(e.to_string()))
    }
}

/// The stderr line for a notice. Rejected input is flagged.
#[must_use]
pub fn notice_line(notice: Notice) -> String {
    if notice.is_validation() {
        format!("error: {notice}")
    } else {
        notice.to_string()
    }
}

/// Prints notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice_line(notice));
    }
}

/// An input field pre-filled from the command line.
#[derive(Debug, Clone, Default)]
pub struct ArgInput {
    text: String,
}

impl ArgInput {
    /// Join command-line words into the field's text.
    #[must_use]
    pub fn from_words(words: &[String]) -> Self {
        Self {
            text: words.join(" "),
        }
    }
}

impl InputField for ArgInput {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteId;

    fn widget(text: &str, controls: Controls) -> NoteWidget {
        NoteWidget {
            id: NoteId::new(),
            index: 2,
            text: text.to_string(),
            modified: false,
            controls,
        }
    }

    #[test]
    fn test_format_editable_widget_shows_short_id() {
        let w = widget("buy milk", Controls::Editable);
        let row = format_widget(&w);

        assert!(row.starts_with("   2  "));
        assert!(row.contains(&w.id.short()));
        assert!(row.ends_with("buy milk"));
    }

    #[test]
    fn test_format_read_only_widget_hides_id() {
        let w = widget("buy milk", Controls::Hidden);
        assert_eq!(format_widget(&w), "   2  buy milk");
    }

    #[test]
    fn test_format_modified_marker() {
        let mut w = widget("draft", Controls::Editable);
        w.modified = true;
        assert!(format_widget(&w).contains(&format!("{}* draft", w.id.short())));
    }

    #[test]
    fn test_format_multiline_indents_continuations() {
        let w = widget("first\nsecond", Controls::Hidden);
        assert_eq!(format_widget(&w), "   2  first\n      second");
    }

    #[test]
    fn test_format_empty_text() {
        let w = widget("", Controls::Hidden);
        assert_eq!(format_widget(&w), "   2  ");
    }

    #[test]
    fn test_terminal_list_writes_rows() {
        let mut list = TerminalList::new(Vec::new());
        list.clear().unwrap();
        list.append(&widget("one", Controls::Hidden)).unwrap();

        assert_eq!(String::from_utf8(list.out).unwrap(), "   2  one\n");
    }

    #[test]
    fn test_redrawing_list_clears_screen() {
        let mut list = TerminalList::redrawing(Vec::new());
        list.clear().unwrap();

        assert_eq!(String::from_utf8(list.out).unwrap(), CLEAR_SCREEN);
    }

    #[test]
    fn test_snapshot_keeps_latest_render() {
        let snapshot = SnapshotList::new();
        let mut surface = snapshot.clone();

        surface.append(&widget("old", Controls::Hidden)).unwrap();
        surface.clear().unwrap();
        surface.append(&widget("new", Controls::Hidden)).unwrap();

        let rows = snapshot.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "new");

        let mut out = Vec::new();
        snapshot.print_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "   2  new\n");
    }

    #[test]
    fn test_terminal_status() {
        let mut status = TerminalStatus::new(Vec::new());
        status.set_text("Last updated at: now").unwrap();

        assert_eq!(
            String::from_utf8(status.out).unwrap(),
            "\nLast updated at: now\n"
        );
    }

    #[test]
    fn test_notice_line_flags_rejected_input() {
        assert_eq!(notice_line(Notice::Created), "Note saved successfully!");
        assert_eq!(
            notice_line(Notice::EmptyEdit),
            "error: Note cannot be empty!"
        );
    }

    #[test]
    fn test_arg_input() {
        let words = vec!["buy".to_string(), "milk".to_string()];
        let mut input = ArgInput::from_words(&words);

        assert_eq!(input.value(), "buy milk");
        input.clear();
        assert_eq!(input.value(), "");
    }
}
