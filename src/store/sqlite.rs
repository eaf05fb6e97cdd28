//! SQLite-backed state store.
//!
//! Holds one row per homework id with the last status that was reported.
//! Writes are single `INSERT OR REPLACE` statements, so a crash never leaves
//! a row mixing old and new fields.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::schema::apply_schema;
use crate::error::{Result, WatchError};
use crate::homework::StoredSnapshot;

/// Durable map from homework id to its last reported snapshot.
///
/// Thread-safe via an internal `Mutex<Connection>`.
pub struct StateStore {
    conn: Mutex<Connection>,
}

impl StateStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or database cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        debug!(path = %path.display(), "state store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Point lookup by homework id. A missing row is `Ok(None)`.
    pub fn get(&self, id: &str) -> Result<Option<StoredSnapshot>> {
        let conn = self.lock()?;
        let snapshot = conn
            .query_row(
                "SELECT id, status, date_updated FROM homeworks WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredSnapshot {
                        id: row.get(0)?,
                        status: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        updated_at: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(snapshot)
    }

    /// Insert the snapshot, replacing any row with the same id.
    pub fn upsert(&self, snapshot: &StoredSnapshot) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO homeworks (id, status, date_updated) VALUES (?1, ?2, ?3)",
            params![snapshot.id, snapshot.status, snapshot.updated_at],
        )?;
        debug!(homework_id = %snapshot.id, status = %snapshot.status, "snapshot saved");
        Ok(())
    }

    /// Number of tracked homeworks.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM homeworks", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Returns `true` when nothing has been recorded yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| WatchError::Store(format!("lock poisoned: {e}")))
    }
}
