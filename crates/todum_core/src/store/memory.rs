//! In-memory slot store.

use crate::store::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-local slot store.
///
/// Clones share the same slots, which lets a test keep a handle after moving
/// the store onto a writer thread.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemorySlotStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slots poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slots poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
