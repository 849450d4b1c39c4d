//! Durable key-value persistence for store collections.
//!
//! # Responsibility
//! - Define the `KvStore` backend contract and its implementations.
//! - Encode collections as JSON arrays under fixed keys.
//!
//! # Invariants
//! - One key per collection, plus one optional key per selection cursor.
//! - Writing a collection then reading it back yields an equal value.
//! - Backend failures surface as `PersistError`, never as panics.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod adapter;
pub mod kv;
pub mod sqlite_kv;

pub use adapter::PersistenceAdapter;
pub use kv::{KvStore, MemoryKvStore};
pub use sqlite_kv::SqliteKvStore;

/// Key holding the JSON array of boards.
pub const BOARDS_KEY: &str = "taskflow_boards";
/// Key holding the JSON array of columns.
pub const COLUMNS_KEY: &str = "taskflow_columns";
/// Key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "taskflow_tasks";
/// Key holding the selected board id, absent when nothing is selected.
pub const SELECTED_BOARD_KEY: &str = "taskflow_selected_board";
/// Key holding the selected task id, absent when nothing is selected.
pub const SELECTED_TASK_KEY: &str = "taskflow_selected_task";

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    /// SQLite-backed store failed.
    Db(DbError),
    /// Backend could not serve the request for a non-database reason.
    Unavailable(String),
    /// Collection could not be serialized.
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// Stored payload is not valid JSON for the expected shape.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// Stored scalar value has an unexpected format.
    InvalidData { key: String, message: String },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Decode { key, source } => write!(f, "failed to decode `{key}`: {source}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid stored value for `{key}`: {message}")
            }
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::Unavailable(_) | Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
