//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Note text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

/// Which note an edit or delete addresses.
#[derive(Debug, Args)]
pub struct Target {
    /// Note id, or a unique prefix of it (as shown by `jot list`)
    #[arg(required_unless_present = "at", conflicts_with = "at")]
    pub id: Option<String>,

    /// Address the note by its position in the list instead
    #[arg(long, value_name = "INDEX")]
    pub at: Option<usize>,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// The note to change
    #[command(flatten)]
    pub target: Target,

    /// Replacement text
    #[arg(short, long, required = true, num_args = 1..)]
    pub message: Vec<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// The note to remove
    #[command(flatten)]
    pub target: Target,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Refresh period in milliseconds (defaults to the configured value)
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
