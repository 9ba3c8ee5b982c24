//! Port abstraction for inventory item storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{InventoryItem, InventoryItemId, InventoryStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by inventory repository adapters.
    pub enum InventoryPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "inventory repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "inventory repository query failed: {message}",
    }
}

/// Status change guarded by the status the caller last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub owner: UserId,
    pub id: InventoryItemId,
    pub from: InventoryStatus,
    pub to: InventoryStatus,
    pub at: DateTime<Utc>,
}

/// Storage for inventory items, always scoped to an owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// All items owned by `owner`, newest first (`created_at`, then `id`, descending).
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<InventoryItem>, InventoryPersistenceError>;

    /// One item owned by `owner`.
    async fn find(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError>;

    /// Persist every item or none of them.
    async fn insert_all(&self, items: &[InventoryItem]) -> Result<(), InventoryPersistenceError>;

    /// Apply `change` only if the item is still in `change.from`.
    ///
    /// Returns `None` when the item is missing or its status moved on.
    async fn update_status(
        &self,
        change: StatusChange,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError>;

    /// Delete an owned item; returns whether a row was removed.
    ///
    /// Listings created from the item keep their data and lose the link.
    async fn delete(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<bool, InventoryPersistenceError>;
}
