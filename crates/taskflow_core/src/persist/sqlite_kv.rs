//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Connection must be migrated to `latest_version()` before use.
//! - Writes are single-row upserts into `kv_entries`; no partial values.

use super::kv::KvStore;
use super::PersistResult;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value store over one owned SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> PersistResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> PersistResult<Self> {
        ensure_kv_connection_ready(&conn)?;
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> PersistResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

fn ensure_kv_connection_ready(conn: &Connection) -> PersistResult<()> {
    let expected = latest_version();
    let actual = current_user_version(conn)?;
    if actual > expected {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: actual,
            latest_supported: expected,
        }
        .into());
    }
    if actual < expected || !table_exists(conn, "kv_entries")? {
        return Err(DbError::MissingRequiredTable("kv_entries").into());
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> PersistResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::db::DbError;
    use crate::persist::{KvStore, PersistError};
    use rusqlite::Connection;

    #[test]
    fn upsert_replaces_value() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        store.set("b", "3").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKvStore::try_new(conn).err().expect("must reject");
        assert!(matches!(
            err,
            PersistError::Db(DbError::MissingRequiredTable("kv_entries"))
        ));
    }
}
