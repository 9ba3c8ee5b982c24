//! Driving port for browsing the marketplace.

use async_trait::async_trait;

use crate::domain::{Error, ListingFilter, MarketplaceListing};

/// Public read access to listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceQuery: Send + Sync {
    /// Listings matching `filter`, newest first.
    async fn list_listings(&self, filter: &ListingFilter)
    -> Result<Vec<MarketplaceListing>, Error>;
}
