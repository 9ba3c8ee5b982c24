//! Marketplace use-cases: browsing, listing creation and sales.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CreateListingRequest, CreatedListing, ListingPersistenceError, ListingRepository,
    MarketplaceCommand, MarketplaceQuery, SoldListing,
};
use crate::domain::{
    Error, ListingDraft, ListingFilter, ListingId, ListingStatus, MarketplaceListing,
    MarketplaceValidationError, UserId,
};

fn map_repository_error(error: ListingPersistenceError) -> Error {
    match error {
        ListingPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingPersistenceError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
        ListingPersistenceError::ItemNotFound { id } => {
            Error::not_found(format!("inventory item {id} not found"))
        }
        ListingPersistenceError::ItemNotListable { id, status } => {
            Error::conflict(format!("inventory item {id} cannot be listed while {status}"))
                .with_details(json!({
                    "from": status.as_str(),
                    "to": "listed",
                    "code": "invalid_transition",
                }))
        }
        ListingPersistenceError::ListingNotFound { id } => {
            Error::not_found(format!("listing {id} not found"))
        }
        ListingPersistenceError::AlreadySold { id } => {
            Error::conflict(format!("listing {id} is already sold"))
                .with_details(json!({ "code": "already_sold" }))
        }
    }
}

pub(crate) fn map_validation_error(error: MarketplaceValidationError) -> Error {
    match error {
        MarketplaceValidationError::EmptyField { field } => {
            Error::invalid_request(format!("missing required field: {field}"))
                .with_details(json!({ "field": field, "code": "missing_field" }))
        }
        other => Error::invalid_request(other.to_string()),
    }
}

/// Marketplace service implementing [`MarketplaceCommand`] and
/// [`MarketplaceQuery`].
#[derive(Clone)]
pub struct MarketplaceService<L> {
    listings: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> MarketplaceService<L> {
    /// Create a service over the listing repository.
    pub fn new(listings: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { listings, clock }
    }
}

#[async_trait]
impl<L> MarketplaceCommand for MarketplaceService<L>
where
    L: ListingRepository,
{
    async fn create_listing(&self, request: CreateListingRequest) -> Result<CreatedListing, Error> {
        let now = self.clock.utc();
        let listing = MarketplaceListing::new(ListingDraft {
            id: ListingId::random(),
            seller: request.seller,
            name: request.name,
            price: request.price,
            category: request.category,
            location: request.location,
            image: request.image,
            status: ListingStatus::Available,
            listed_at: now,
            inventory_item_id: request.inventory_item_id,
        })
        .map_err(map_validation_error)?;

        let inventory_item = match request.inventory_item_id {
            Some(item_id) => Some(
                self.listings
                    .insert_from_inventory(&listing, &item_id, now)
                    .await
                    .map_err(map_repository_error)?,
            ),
            None => {
                self.listings
                    .insert(&listing)
                    .await
                    .map_err(map_repository_error)?;
                None
            }
        };

        info!(
            listing_id = %listing.id(),
            seller = %listing.seller(),
            from_inventory = inventory_item.is_some(),
            "created marketplace listing"
        );
        Ok(CreatedListing {
            listing,
            inventory_item,
        })
    }

    async fn mark_sold(&self, seller: &UserId, id: &ListingId) -> Result<SoldListing, Error> {
        let sold = self
            .listings
            .mark_sold(seller, id, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        info!(listing_id = %id, "marked listing sold");
        Ok(sold)
    }
}

#[async_trait]
impl<L> MarketplaceQuery for MarketplaceService<L>
where
    L: ListingRepository,
{
    async fn list_listings(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<MarketplaceListing>, Error> {
        self.listings
            .list(filter)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "marketplace_service_tests.rs"]
mod tests;
