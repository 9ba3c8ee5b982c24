//! Port abstraction for marketplace listing storage.
//!
//! Operations that touch both a listing and its source inventory item run
//! atomically inside the adapter: either both rows change or neither does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    InventoryItem, InventoryItemId, InventoryStatus, ListingFilter, ListingId,
    MarketplaceListing, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
        /// The source inventory item does not exist for this seller.
        ItemNotFound { id: InventoryItemId } => "inventory item {id} not found",
        /// The source inventory item cannot be listed from its current status.
        ItemNotListable { id: InventoryItemId, status: InventoryStatus } =>
            "inventory item {id} cannot be listed while {status}",
        /// The listing does not exist for this seller.
        ListingNotFound { id: ListingId } => "listing {id} not found",
        /// The listing was already sold.
        AlreadySold { id: ListingId } => "listing {id} is already sold",
    }
}

/// Result of marking a listing sold.
#[derive(Debug, Clone, PartialEq)]
pub struct SoldListing {
    pub listing: MarketplaceListing,
    /// Linked inventory item, when it still exists.
    pub item: Option<InventoryItem>,
}

/// Storage for marketplace listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Listings matching `filter`, newest first (`listed_at`, then `id`, descending).
    async fn list(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<MarketplaceListing>, ListingPersistenceError>;

    /// Insert a listing that is not linked to an inventory item.
    async fn insert(&self, listing: &MarketplaceListing) -> Result<(), ListingPersistenceError>;

    /// Insert `listing` and move its source item to `listed` in one transaction.
    ///
    /// The item is looked up under `listing.seller()`; the transition is
    /// checked against the item's status inside the same transaction.
    async fn insert_from_inventory(
        &self,
        listing: &MarketplaceListing,
        item_id: &InventoryItemId,
        at: DateTime<Utc>,
    ) -> Result<InventoryItem, ListingPersistenceError>;

    /// Mark a seller's listing sold together with its linked item.
    async fn mark_sold(
        &self,
        seller: &UserId,
        id: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<SoldListing, ListingPersistenceError>;
}
