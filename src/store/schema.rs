//! SQLite DDL for the homework state store.

use rusqlite::Connection;

/// Complete DDL for the state database.
///
/// Uses `IF NOT EXISTS` so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
-- Last reported status per homework.
CREATE TABLE IF NOT EXISTS homeworks (
    id           TEXT PRIMARY KEY,
    status       TEXT,
    date_updated TEXT
);
"#;

/// Apply the schema to an open connection. Safe to call multiple times.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
