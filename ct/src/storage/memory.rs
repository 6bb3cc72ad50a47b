//! In-memory storage, used by tests.

use crate::storage::Storage;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// HashMap-backed store. Also counts writes per key so tests can assert
/// persistence granularity (e.g. one save per bulk batch).
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `put` was called for `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

// Lets tests keep a handle on the store after handing it to AppState.
impl Storage for std::sync::Arc<MemoryStorage> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn path(&self) -> &str {
        (**self).path()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        *self
            .writes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }

    fn path(&self) -> &str {
        ":memory:"
    }
}
