//! Typed JSON layer over a [`KvStore`] backend.
//!
//! # Responsibility
//! - Encode/decode entity collections as JSON arrays.
//! - Encode selection cursors as bare id strings, removing the key on clear.
//!
//! # Invariants
//! - A missing collection key reads as an empty collection.
//! - The adapter holds no cache; every call hits the backend.

use super::kv::{KvStore, MemoryKvStore};
use super::{PersistError, PersistResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use uuid::Uuid;

/// Shared handle used by all stores of one process.
#[derive(Clone)]
pub struct PersistenceAdapter {
    backend: Rc<dyn KvStore>,
}

impl PersistenceAdapter {
    pub fn new(backend: Rc<dyn KvStore>) -> Self {
        Self { backend }
    }

    /// Adapter over a fresh [`MemoryKvStore`].
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryKvStore::new()))
    }

    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> PersistResult<Vec<T>> {
        match self.backend.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| PersistError::Decode {
                key: key.to_string(),
                source,
            }),
        }
    }

    pub fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> PersistResult<()> {
        let raw = serde_json::to_string(items).map_err(|source| PersistError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &raw)
    }

    pub fn load_cursor(&self, key: &str) -> PersistResult<Option<Uuid>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Uuid::parse_str(trimmed)
            .map(Some)
            .map_err(|err| PersistError::InvalidData {
                key: key.to_string(),
                message: err.to_string(),
            })
    }

    pub fn save_cursor(&self, key: &str, cursor: Option<Uuid>) -> PersistResult<()> {
        match cursor {
            Some(id) => self.backend.set(key, &id.to_string()),
            None => self.backend.remove(key),
        }
    }
}
