//! Sell flow: listing an item and marking listings sold.
//!
//! Local lists are never edited optimistically. The action tracks a
//! `pending` flag while the server works and, once it confirms, refetches
//! both the inventory and the marketplace views.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{ListingChange, NewListing};
use crate::resource::Refetch;

/// Marketplace writes used by [`SellAction`].
#[async_trait]
pub trait ListingPublisher: Send + Sync {
    /// Create a listing.
    async fn publish(&self, listing: &NewListing) -> Result<ListingChange, ClientError>;

    /// Mark a listing sold.
    async fn close(&self, listing_id: &str) -> Result<ListingChange, ClientError>;
}

#[async_trait]
impl ListingPublisher for ApiClient {
    async fn publish(&self, listing: &NewListing) -> Result<ListingChange, ClientError> {
        self.create_listing(listing).await
    }

    async fn close(&self, listing_id: &str) -> Result<ListingChange, ClientError> {
        self.mark_sold(listing_id).await
    }
}

/// Observable sell state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellState {
    /// Whether a request is awaiting the server.
    pub pending: bool,
    /// Last confirmed change.
    pub last_change: Option<ListingChange>,
    /// Error from the last request.
    pub error: Option<ClientError>,
}

/// Views refreshed after a confirmed sale.
pub struct SellTargets {
    /// The inventory view.
    pub inventory: Arc<dyn Refetch>,
    /// The marketplace view.
    pub marketplace: Arc<dyn Refetch>,
}

/// Releases `pending` when a sell future is dropped before the server answers.
struct PendingGuard<'a>(&'a watch::Sender<SellState>);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            let was_pending = state.pending;
            state.pending = false;
            was_pending
        });
    }
}

/// Request/response driven sell action.
pub struct SellAction<P> {
    publisher: Arc<P>,
    targets: SellTargets,
    state: watch::Sender<SellState>,
}

impl<P: ListingPublisher> SellAction<P> {
    /// Action refreshing `targets` after each confirmed change.
    pub fn new(publisher: Arc<P>, targets: SellTargets) -> Self {
        let (state, _) = watch::channel(SellState::default());
        Self {
            publisher,
            targets,
            state,
        }
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SellState> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SellState {
        self.state.borrow().clone()
    }

    /// List an item on the marketplace.
    ///
    /// # Errors
    /// [`ClientError::Busy`] while another request is pending; otherwise the
    /// publisher's error.
    pub async fn sell(&self, listing: &NewListing) -> Result<ListingChange, ClientError> {
        let _pending = self.begin()?;
        let outcome = self.publisher.publish(listing).await;
        self.finish(outcome)
    }

    /// Mark a listing sold.
    ///
    /// # Errors
    /// As for [`SellAction::sell`].
    pub async fn mark_sold(&self, listing_id: &str) -> Result<ListingChange, ClientError> {
        let _pending = self.begin()?;
        let outcome = self.publisher.close(listing_id).await;
        self.finish(outcome)
    }

    fn begin(&self) -> Result<PendingGuard<'_>, ClientError> {
        let claimed = self.state.send_if_modified(|state| {
            if state.pending {
                return false;
            }
            state.pending = true;
            state.error = None;
            true
        });
        if claimed {
            Ok(PendingGuard(&self.state))
        } else {
            Err(ClientError::Busy)
        }
    }

    fn finish(
        &self,
        outcome: Result<ListingChange, ClientError>,
    ) -> Result<ListingChange, ClientError> {
        match &outcome {
            Ok(change) => {
                info!(
                    listing = %change.marketplace_item.id,
                    status = %change.marketplace_item.status,
                    "listing change confirmed"
                );
                self.state.send_modify(|state| {
                    state.pending = false;
                    state.last_change = Some(change.clone());
                });
                self.targets.inventory.refetch();
                self.targets.marketplace.refetch();
            }
            Err(error) => {
                warn!(%error, "listing change failed");
                self.state.send_modify(|state| {
                    state.pending = false;
                    state.error = Some(error.clone());
                });
            }
        }
        outcome
    }
}
