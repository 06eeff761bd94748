//! `SQLite` schema for the key-value backend.

/// One row per key. `value` holds the whole serialized note list.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Bookkeeping rows, currently just the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Index backing the "last write" lookup in `stats()`.
pub const CREATE_KV_UPDATED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_kv_updated_at ON kv(updated_at)";

/// Tables every database needs before migrations run.
pub const BASE_TABLES: &[&str] = &[CREATE_KV_TABLE, CREATE_METADATA_TABLE];
