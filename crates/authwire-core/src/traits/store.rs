//! Credential store trait.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Slot;
use crate::{AccessToken, RefreshToken};

/// Key-value storage for the two credential slots.
///
/// The store is shared process-wide: the request decorator reads it on every
/// request and the refresh coordinator writes it on refresh and teardown.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a slot. `Ok(None)` means the slot is empty.
    async fn get(&self, slot: Slot) -> Result<Option<String>, StoreError>;

    /// Write a slot, replacing any previous value.
    async fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError>;

    /// Empty a slot. Removing an empty slot is not an error.
    async fn remove(&self, slot: Slot) -> Result<(), StoreError>;

    /// Read the access slot as a token.
    async fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.get(Slot::Access).await?.map(AccessToken::new))
    }

    /// Read the refresh slot as a token.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.get(Slot::Refresh).await?.map(RefreshToken::new))
    }
}
