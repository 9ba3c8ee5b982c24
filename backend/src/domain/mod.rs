//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities behind the room scanning,
//! inventory and marketplace workflows, plus the services that implement the
//! driving ports in [`ports`]. Nothing in here knows about HTTP or SQL.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: API error payload and stable codes.
//! - [`User`], [`InventoryItem`], [`MarketplaceListing`]: the stored aggregates.
//! - [`InventoryStatus`]: the item lifecycle shared by inventory and
//!   marketplace operations.
//! - `*Service` types implementing the driving ports.

pub mod account_service;
pub mod auth;
pub mod detection;
pub mod detection_service;
pub mod error;
pub mod health_service;
pub mod inventory;
pub mod inventory_service;
pub mod marketplace;
pub mod marketplace_service;
pub mod ports;
pub mod retry;
pub mod suggestion;
pub mod suggestion_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, Registration,
    RegistrationValidationError,
};
pub use self::detection::{
    DetectedObject, DetectionReport, RoomImage, StoredImage, UNKNOWN_OBJECT_CATEGORY,
    UNKNOWN_OBJECT_NAME, UPLOADS_URL_PREFIX, is_plain_file_name, sanitise_file_name,
    stored_file_name,
};
pub use self::detection_service::{DetectionRuntime, DetectionService, DetectionServicePorts};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::health_service::HealthService;
pub use self::inventory::{
    BoundingBox, Confidence, DetectionMethod, InventoryItem, InventoryItemDraft, InventoryItemId,
    InventoryStatus, InventoryValidationError,
};
pub use self::inventory_service::InventoryService;
pub use self::marketplace::{
    ListingDraft, ListingFilter, ListingId, ListingStatus, MarketplaceListing,
    MarketplaceValidationError, Price, PriceRange,
};
pub use self::marketplace_service::MarketplaceService;
pub use self::retry::{AttemptJitter, BackoffJitter, RetryPolicy, RetrySleeper, TokioSleeper};
pub use self::suggestion::{
    MAX_SUGGESTIONS, PLACEHOLDER_IMAGE, Suggestion, display_name, fallback_suggestions,
    suggestions_from_catalogue,
};
pub use self::suggestion_service::SuggestionService;
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, USERNAME_MAX, User, UserId, UserValidationError, Username};
