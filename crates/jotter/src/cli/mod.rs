//! Command-line interface for jotter.
//!
//! This module provides the CLI structure for the `jot` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, EditCommand, ListCommand, StatusCommand, Target,
    WatchCommand,
};

use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::note::NoteId;
use crate::surface::NoteWidget;

/// jot - keep a short list of notes
///
/// Notes are stored in a local database and can be listed, edited in place
/// and deleted. `jot watch` shows the list and follows changes made from
/// other terminals.
#[derive(Debug, Parser)]
#[command(name = "jot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a note
    Add(AddCommand),

    /// Print all notes
    List(ListCommand),

    /// Replace the text of a note
    Edit(EditCommand),

    /// Remove a note
    Delete(DeleteCommand),

    /// Show the list and keep it up to date until interrupted
    Watch(WatchCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// Find the note a [`Target`] names among the displayed widgets.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] for a position past the end,
/// [`Error::UnknownId`] when no id has the given prefix and
/// [`Error::AmbiguousId`] when several do.
pub fn resolve_target(widgets: &[NoteWidget], target: &Target) -> Result<NoteId> {
    if let Some(index) = target.at {
        return widgets
            .get(index)
            .map(|w| w.id)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: widgets.len(),
            });
    }

    let prefix = target.id.as_deref().unwrap_or_default();
    let matches: Vec<NoteId> = widgets
        .iter()
        .filter(|w| w.id.matches_prefix(prefix))
        .map(|w| w.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::UnknownId {
            prefix: prefix.to_string(),
        }),
        _ => Err(Error::AmbiguousId {
            prefix: prefix.to_string(),
            count: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Controls;
    use clap::CommandFactory;

    fn widget(id: &str, index: usize) -> NoteWidget {
        NoteWidget {
            id: id.parse().unwrap(),
            index,
            text: format!("note {index}"),
            modified: false,
            controls: Controls::Editable,
        }
    }

    fn widgets() -> Vec<NoteWidget> {
        vec![
            widget("aaaa1111-0000-4000-8000-000000000000", 0),
            widget("aaaa2222-0000-4000-8000-000000000000", 1),
            widget("bbbb1111-0000-4000-8000-000000000000", 2),
        ]
    }

    fn by_id(prefix: &str) -> Target {
        Target {
            id: Some(prefix.to_string()),
            at: None,
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "jot");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["jot", "-q", "list"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["jot", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["jot", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["jot", "-vv", "list"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_add_joins_words() {
        let cli = parse(&["jot", "add", "buy", "milk"]);
        let Command::Add(add) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(add.text, vec!["buy", "milk"]);
    }

    #[test]
    fn test_parse_add_requires_text() {
        assert!(Cli::try_parse_from(["jot", "add"]).is_err());
    }

    #[test]
    fn test_parse_edit_by_id() {
        let cli = parse(&["jot", "edit", "3fa2", "-m", "new", "text"]);
        let Command::Edit(edit) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(edit.target.id.as_deref(), Some("3fa2"));
        assert_eq!(edit.target.at, None);
        assert_eq!(edit.message, vec!["new", "text"]);
    }

    #[test]
    fn test_parse_edit_by_index() {
        let cli = parse(&["jot", "edit", "--at", "1", "-m", "text"]);
        let Command::Edit(edit) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(edit.target.at, Some(1));
        assert!(edit.target.id.is_none());
    }

    #[test]
    fn test_parse_edit_requires_target_and_message() {
        assert!(Cli::try_parse_from(["jot", "edit", "-m", "text"]).is_err());
        assert!(Cli::try_parse_from(["jot", "edit", "3fa2"]).is_err());
        assert!(Cli::try_parse_from(["jot", "edit", "3fa2", "--at", "0", "-m", "x"]).is_err());
    }

    #[test]
    fn test_parse_delete() {
        let cli = parse(&["jot", "delete", "--at", "0"]);
        assert!(matches!(
            cli.command,
            Command::Delete(DeleteCommand {
                target: Target { at: Some(0), .. }
            })
        ));
    }

    #[test]
    fn test_parse_watch_interval() {
        let cli = parse(&["jot", "watch", "--interval-ms", "500"]);
        assert!(matches!(
            cli.command,
            Command::Watch(WatchCommand {
                interval_ms: Some(500)
            })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["jot", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_resolve_target_by_unique_prefix() {
        let widgets = widgets();
        assert_eq!(resolve_target(&widgets, &by_id("bbbb")).unwrap(), widgets[2].id);
        assert_eq!(resolve_target(&widgets, &by_id("aaaa2")).unwrap(), widgets[1].id);
    }

    #[test]
    fn test_resolve_target_by_full_id() {
        let widgets = widgets();
        let full = widgets[0].id.to_string();
        assert_eq!(resolve_target(&widgets, &by_id(&full)).unwrap(), widgets[0].id);
    }

    #[test]
    fn test_resolve_target_ambiguous() {
        let err = resolve_target(&widgets(), &by_id("aaaa")).unwrap_err();
        assert!(matches!(err, Error::AmbiguousId { count: 2, .. }));
    }

    #[test]
    fn test_resolve_target_unknown() {
        let err = resolve_target(&widgets(), &by_id("cccc")).unwrap_err();
        assert!(matches!(err, Error::UnknownId { .. }));
    }

    #[test]
    fn test_resolve_target_by_index() {
        let widgets = widgets();
        let target = Target {
            id: None,
            at: Some(1),
        };
        assert_eq!(resolve_target(&widgets, &target).unwrap(), widgets[1].id);

        let target = Target {
            id: None,
            at: Some(3),
        };
        assert!(matches!(
            resolve_target(&widgets, &target),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["jot", "config", "validate", "--file", "x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
