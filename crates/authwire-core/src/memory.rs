//! In-memory credential store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::traits::CredentialStore;
use crate::types::Slot;

/// A process-local [`CredentialStore`] backed by a map.
///
/// Useful for short-lived programs and as a test double.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slots: RwLock<HashMap<Slot, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with both tokens.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(Slot::Access, access.into());
        slots.insert(Slot::Refresh, refresh.into());
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Snapshot a slot without going through the async trait.
    pub fn peek(&self, slot: Slot) -> Option<String> {
        self.read().ok().and_then(|slots| slots.get(&slot).cloned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Slot, String>>, StoreError> {
        self.slots.read().map_err(|_| StoreError::Unavailable {
            message: "credential map lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Slot, String>>, StoreError> {
        self.slots.write().map_err(|_| StoreError::Unavailable {
            message: "credential map lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(&slot).cloned())
    }

    async fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.write()?.insert(slot, value.to_string());
        Ok(())
    }

    async fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        self.write()?.remove(&slot);
        Ok(())
    }
}
