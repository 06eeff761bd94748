//! `jot` - CLI for jotter
//!
//! This binary adds, lists, edits and deletes notes, and can keep a
//! read-only view of the list on screen while other terminals change it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::debug;

use jotter::cli::{
    resolve_target, AddCommand, Cli, Command, ConfigCommand, DeleteCommand, EditCommand,
    ListCommand, WatchCommand,
};
use jotter::controller::status_text;
use jotter::terminal::{ArgInput, ConsoleNotifier, SnapshotList, TerminalList, TerminalStatus};
use jotter::{
    init_logging, ActionOutcome, Config, Error, Host, ListOptions, Mode, NoteListController,
    NoteStore, SqliteKvStore,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Edit(cmd) => handle_edit(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Watch(cmd) => handle_watch(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_kv(config: &Config) -> anyhow::Result<Arc<SqliteKvStore>> {
    let path = config.database_path();
    let kv = SqliteKvStore::open(&path)
        .with_context(|| format!("opening note database {}", path.display()))?;
    Ok(Arc::new(kv))
}

fn open_store(config: &Config) -> anyhow::Result<NoteStore> {
    Ok(NoteStore::new(open_kv(config)?, config.store.key.clone()))
}

/// Controller for a one-shot command: no timer, output collected in `snapshot`.
fn one_shot(
    config: &Config,
    snapshot: &SnapshotList,
    input: Option<ArgInput>,
) -> anyhow::Result<NoteListController> {
    let mut host = Host::new(Box::new(snapshot.clone()));
    if let Some(input) = input {
        host = host.with_input(Box::new(input));
    }

    let options = ListOptions {
        auto_refresh: false,
        ..ListOptions::from_config(config)
    };
    let controller =
        NoteListController::new(open_store(config)?, host, options, Arc::new(ConsoleNotifier));
    controller.initialize()?;
    Ok(controller)
}

fn print_snapshot(snapshot: &SnapshotList) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    snapshot.print_to(&mut out)?;
    out.flush()?;
    Ok(())
}

fn report(outcome: ActionOutcome, snapshot: &SnapshotList) -> anyhow::Result<()> {
    print_snapshot(snapshot)?;
    match outcome {
        ActionOutcome::Applied => Ok(()),
        ActionOutcome::Rejected => Err(Error::EmptyInput.into()),
        ActionOutcome::Stale => bail!("the note changed or was removed elsewhere; list refreshed"),
    }
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let snapshot = SnapshotList::new();
    let controller = one_shot(config, &snapshot, Some(ArgInput::from_words(&cmd.text)))?;
    let outcome = controller.handle_create()?;
    report(outcome, &snapshot)
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    if cmd.json {
        let notes = open_store(config)?.list_all();
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    let snapshot = SnapshotList::new();
    one_shot(config, &snapshot, None)?;
    if snapshot.rows().is_empty() {
        println!("No notes yet. Add one with `jot add <TEXT>`.");
        return Ok(());
    }
    print_snapshot(&snapshot)
}

fn handle_edit(config: &Config, cmd: &EditCommand) -> anyhow::Result<()> {
    let snapshot = SnapshotList::new();
    let controller = one_shot(config, &snapshot, None)?;

    let id = resolve_target(&controller.widgets()?, &cmd.target)?;
    debug!("Editing note {}", id);
    if !controller.edit_widget(id, cmd.message.join(" "))? {
        bail!("note {} is not displayed", id.short());
    }
    let outcome = controller.commit_edit(id)?;
    report(outcome, &snapshot)
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let snapshot = SnapshotList::new();
    let controller = one_shot(config, &snapshot, None)?;

    let id = resolve_target(&controller.widgets()?, &cmd.target)?;
    debug!("Deleting note {}", id);
    let outcome = controller.delete(id)?;
    report(outcome, &snapshot)
}

fn handle_watch(config: &Config, cmd: &WatchCommand) -> anyhow::Result<()> {
    let interval = cmd
        .interval_ms
        .map_or_else(|| config.refresh_interval(), Duration::from_millis);
    if interval.is_zero() {
        bail!("refresh interval must be greater than zero");
    }

    let store = open_store(config)?;
    let host = Host::new(Box::new(TerminalList::redrawing(std::io::stdout())))
        .with_status(Box::new(TerminalStatus::new(std::io::stdout())));
    let controller = NoteListController::new(
        store,
        host,
        ListOptions::read_only(interval),
        Arc::new(ConsoleNotifier),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let handle = controller.initialize()?;
        tokio::signal::ctrl_c().await?;
        if let Some(handle) = handle {
            handle.cancel();
        }
        anyhow::Ok(())
    })
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let kv = open_kv(config)?;
    let stats = kv.stats()?;
    let store = NoteStore::new(kv.clone(), config.store.key.clone());
    let notes = store.len();

    if json {
        let status = serde_json::json!({
            "database_path": kv.path(),
            "key": store.key(),
            "mode": config.list.mode,
            "notes": notes,
            "total_keys": stats.total_keys,
            "last_write": stats.last_write,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("jot status");
        println!("----------");
        println!("Database:      {}", kv.path().display());
        println!("Key:           {}", store.key());
        println!("Mode:          {}", config.list.mode);
        println!("Notes:         {notes}");
        println!("Keys stored:   {}", stats.total_keys);
        println!("Size:          {} bytes", stats.db_size_bytes);
        match stats.last_write {
            Some(at) => println!(
                "Last write:    {}",
                status_text(at.with_timezone(&chrono::Local))
            ),
            None => println!("Last write:    never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Key:                {}", config.store.key);
                println!();
                println!("[List]");
                println!("  Mode:               {}", config.list.mode);
                println!("  Auto refresh:       {}", config.list.auto_refresh);
                println!("  Refresh interval:   {} ms", config.list.refresh_interval_ms);
                if config.list.mode == Mode::ReadOnly && !config.list.auto_refresh {
                    println!();
                    println!("Note: a read-only list without auto refresh never changes.");
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
