//! Driving port for inventory mutations.

use async_trait::async_trait;

use crate::domain::{
    Confidence, DetectionMethod, Error, InventoryItem, InventoryItemId, InventoryStatus, UserId,
};

/// Manually added inventory item.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInventoryItemRequest {
    pub owner: UserId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub confidence: Option<Confidence>,
    pub detection_method: DetectionMethod,
}

/// Owner-requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateInventoryStatusRequest {
    pub owner: UserId,
    pub id: InventoryItemId,
    pub status: InventoryStatus,
}

/// Write operations on a user's inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryCommand: Send + Sync {
    /// Add an item; new items always start as `detected`.
    async fn create_item(&self, request: CreateInventoryItemRequest)
    -> Result<InventoryItem, Error>;

    /// Move an owned item along the lifecycle.
    ///
    /// `listed` and `sold` are rejected as invalid requests; other
    /// disallowed transitions are conflicts.
    async fn update_status(
        &self,
        request: UpdateInventoryStatusRequest,
    ) -> Result<InventoryItem, Error>;

    /// Permanently remove an owned item.
    async fn delete_item(&self, owner: &UserId, id: &InventoryItemId) -> Result<(), Error>;
}
