//! In-memory slot backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{DurableSlot, SlotError};

/// Slot backed by a process-local map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-populated with one value.
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self {
            values: RwLock::new(values),
        }
    }
}

impl DurableSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let values = self.values.read().map_err(|_| SlotError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut values = self.values.write().map_err(|_| SlotError::Poisoned)?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, SlotError> {
        let mut values = self.values.write().map_err(|_| SlotError::Poisoned)?;
        Ok(values.remove(key).is_some())
    }
}
