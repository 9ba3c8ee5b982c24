//! Client-side state controllers for the redecor backend.
//!
//! [`ApiClient`] speaks the REST API with a cookie-backed session.
//! [`Resource`] mirrors one remote read into observable state and refetches
//! on key changes or invalidation. [`ObjectDetectionController`] runs one room
//! scan at a time and [`SellAction`] performs sells without optimistic local
//! edits; both refresh dependent resources once the server confirms.
//!
//! # Examples
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures_util::FutureExt as _;
//! use redecor_client::{ApiClient, MarketplaceFilters, Refetch, Resource, SellAction, SellTargets};
//!
//! # async fn run() -> Result<(), redecor_client::ClientError> {
//! let api = Arc::new(ApiClient::new("http://localhost:5000")?);
//! api.login("maya@example.com", "correct horse").await?;
//!
//! let inventory = {
//!     let api = Arc::clone(&api);
//!     Arc::new(Resource::mount((), move |()| {
//!         let api = Arc::clone(&api);
//!         async move { api.inventory().await }.boxed()
//!     }))
//! };
//! let marketplace = {
//!     let api = Arc::clone(&api);
//!     Arc::new(Resource::mount(MarketplaceFilters::default(), move |filters| {
//!         let api = Arc::clone(&api);
//!         async move { api.marketplace(&filters).await }.boxed()
//!     }))
//! };
//! let sell = SellAction::new(
//!     Arc::clone(&api),
//!     SellTargets {
//!         inventory: inventory.clone() as Arc<dyn Refetch>,
//!         marketplace: marketplace.clone() as Arc<dyn Refetch>,
//!     },
//! );
//! # let _ = sell;
//! # Ok(())
//! # }
//! ```

mod api;
mod detection;
mod error;
mod models;
mod resource;
mod sell;

pub use api::ApiClient;
pub use detection::{DetectionState, ObjectDetectionController, RoomScanner};
pub use error::{ClientError, UNREACHABLE_MESSAGE};
pub use models::{
    DetectionOutcome, ImageFile, InventoryItem, InventoryPage, Listing, ListingChange,
    MarketplaceFilters, MarketplacePage, NewInventoryItem, NewListing, Registration,
    ServiceHealth, Suggestion, UploadedRoom, User,
};
pub use resource::{Refetch, Resource, ResourceState};
pub use sell::{ListingPublisher, SellAction, SellState, SellTargets};
