//! Driving port for marketplace mutations.

use async_trait::async_trait;

use crate::domain::{
    Error, InventoryItem, InventoryItemId, ListingId, MarketplaceListing, Price, UserId,
};

use super::SoldListing;

/// New listing, optionally created from an inventory item.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateListingRequest {
    pub seller: UserId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub location: String,
    pub image: String,
    pub inventory_item_id: Option<InventoryItemId>,
}

/// Listing plus the inventory item it moved to `listed`, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedListing {
    pub listing: MarketplaceListing,
    pub inventory_item: Option<InventoryItem>,
}

/// Write operations on marketplace listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceCommand: Send + Sync {
    /// Publish a listing. With an inventory item the item becomes `listed` in
    /// the same transaction.
    async fn create_listing(&self, request: CreateListingRequest) -> Result<CreatedListing, Error>;

    /// Mark the seller's listing and its linked item as sold.
    async fn mark_sold(&self, seller: &UserId, id: &ListingId) -> Result<SoldListing, Error>;
}
