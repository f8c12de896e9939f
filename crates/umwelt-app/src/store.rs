//! An in-process long-term memory.
//!
//! The injected-capability implementation used by tests and the demo
//! binary. Real deployments hand the runtime whatever store the robot
//! carries; the engine never knows the difference.

use parking_lot::RwLock;
use std::collections::HashMap;
use umwelt_model::{LongTermMemory, MemoryError};

/// A `(namespace, key)` → value map behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl LongTermMemory for InMemoryStore {
    fn store(&self, namespace: &str, key: &str, value: serde_json::Value) -> Result<(), MemoryError> {
        self.entries
            .write()
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    fn recall(&self, namespace: &str, key: &str) -> Result<Option<serde_json::Value>, MemoryError> {
        Ok(self
            .entries
            .read()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }
}
