//! Driving port for inventory reads.

use async_trait::async_trait;

use crate::domain::{Error, InventoryItem, InventoryItemId, UserId};

/// Read operations on a user's inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryQuery: Send + Sync {
    /// Every item the user owns, newest first.
    async fn list_items(&self, owner: &UserId) -> Result<Vec<InventoryItem>, Error>;

    /// One owned item; items of other users are reported as not found.
    async fn get_item(&self, owner: &UserId, id: &InventoryItemId) -> Result<InventoryItem, Error>;
}
