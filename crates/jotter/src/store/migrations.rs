//! Schema versioning for the `SQLite` key-value backend.
//!
//! The version lives in the `metadata` table. A fresh database reports
//! version 0 and is walked forward through [`STEPS`], each step in its own
//! transaction.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{BASE_TABLES, CREATE_KV_UPDATED_INDEX};

/// Statements that take the schema from `version - 1` to `version`.
struct Step {
    version: i32,
    statements: &'static [&'static str],
}

/// Every migration, in order. Version 1 is the base tables alone.
const STEPS: &[Step] = &[
    Step {
        version: 1,
        statements: &[],
    },
    Step {
        version: 2,
        statements: &[CREATE_KV_UPDATED_INDEX],
    },
];

/// The schema version this build writes.
pub const CURRENT_VERSION: i32 = 2;

const VERSION_KEY: &str = "schema_version";

/// Create the base tables if missing and apply pending migrations.
///
/// # Errors
///
/// Returns an error if a statement fails, the stored version is unreadable,
/// or the database was written by a newer version of jotter.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in BASE_TABLES {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    let pending: Vec<&Step> = STEPS.iter().filter(|s| s.version > version).collect();
    if pending.is_empty() {
        return Ok(());
    }

    info!(
        "Migrating note database from schema {} to {}",
        version, CURRENT_VERSION
    );
    for step in pending {
        apply(conn, step)?;
    }
    Ok(())
}

/// The stored schema version, 0 when none is recorded.
///
/// # Errors
///
/// Returns an error if the metadata table cannot be read or holds a
/// non-numeric version.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn apply(conn: &Connection, step: &Step) -> Result<()> {
    debug!("Applying kv schema step {}", step.version);

    let tx = conn.unchecked_transaction()?;
    for statement in step.statements {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("step {} failed: {e}", step.version),
        })?;
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, step.version.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}
