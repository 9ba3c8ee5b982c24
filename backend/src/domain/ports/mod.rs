//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`ObjectDetector`], [`ImageStore`],
//! [`PasswordHasher`], [`DetectionMetrics`]) are implemented by outbound
//! adapters. Driving ports (`*Command`, `*Query`) are implemented by domain
//! services and consumed by inbound HTTP handlers.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod detection_command;
mod detection_metrics;
mod image_store;
mod inventory_command;
mod inventory_query;
mod inventory_repository;
mod listing_repository;
mod marketplace_command;
mod marketplace_query;
mod object_detector;
mod password_hasher;
mod service_health_query;
mod suggestion_query;
mod user_repository;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
#[cfg(test)]
pub use detection_command::MockDetectionCommand;
pub use detection_command::{DetectObjectsRequest, DetectObjectsResponse, DetectionCommand};
#[cfg(test)]
pub use detection_metrics::MockDetectionMetrics;
pub use detection_metrics::{
    DetectionMetrics, DetectionMetricsError, DetectionOutcome, DetectionOutcomeKind,
    NoOpDetectionMetrics,
};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use inventory_command::MockInventoryCommand;
pub use inventory_command::{
    CreateInventoryItemRequest, InventoryCommand, UpdateInventoryStatusRequest,
};
pub use inventory_query::InventoryQuery;
#[cfg(test)]
pub use inventory_query::MockInventoryQuery;
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{InventoryPersistenceError, InventoryRepository, StatusChange};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingPersistenceError, ListingRepository, SoldListing};
#[cfg(test)]
pub use marketplace_command::MockMarketplaceCommand;
pub use marketplace_command::{CreateListingRequest, CreatedListing, MarketplaceCommand};
pub use marketplace_query::MarketplaceQuery;
#[cfg(test)]
pub use marketplace_query::MockMarketplaceQuery;
#[cfg(test)]
pub use object_detector::MockObjectDetector;
pub use object_detector::{
    DetectorCatalogue, DetectorHealth, ObjectDetector, ObjectDetectorError,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use service_health_query::MockServiceHealthQuery;
pub use service_health_query::{DetectorStatus, ServiceHealthQuery};
#[cfg(test)]
pub use suggestion_query::MockSuggestionQuery;
pub use suggestion_query::SuggestionQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
