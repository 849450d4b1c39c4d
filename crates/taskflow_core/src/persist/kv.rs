//! Key-value backend contract and the in-memory implementation.

use super::PersistResult;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Durable string-keyed storage used by [`super::PersistenceAdapter`].
///
/// Methods take `&self`: backends are shared by the three stores in a
/// single-threaded process and manage their own interior mutability.
pub trait KvStore {
    /// Reads one value; `None` when the key was never written or was removed.
    fn get(&self, key: &str) -> PersistResult<Option<String>>;
    /// Inserts or replaces one value.
    fn set(&self, key: &str, value: &str) -> PersistResult<()>;
    /// Removes one key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> PersistResult<()>;
}

/// Process-local backend; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all entries, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> PersistResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PersistResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
