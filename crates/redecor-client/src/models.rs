//! Wire models exchanged with the backend.
//!
//! Item and listing bodies use camelCase keys; envelopes keep the backend's
//! exact key names (`filters_applied`, `marketplace_item`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account id.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// One inventory item owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Item id.
    pub id: String,
    /// Owner id.
    pub user_id: String,
    /// Item name.
    pub name: String,
    /// Item category.
    pub category: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Public path of the source photo.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Detector confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Bounding box `[x1, y1, x2, y2]`.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    /// `manual` or `ai_scan`.
    pub detection_method: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Marketplace listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing id.
    pub id: String,
    /// Seller id.
    pub seller_id: String,
    /// Listing title.
    pub name: String,
    /// Asking price.
    pub price: f64,
    /// Listing category.
    pub category: String,
    /// Pickup location.
    pub location: String,
    /// Image reference.
    pub image: String,
    /// `available` or `sold`.
    pub status: String,
    /// Listing time.
    pub listed_at: DateTime<Utc>,
    /// Source inventory item, if any.
    #[serde(default)]
    pub inventory_id: Option<String>,
}

/// Registration form.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Chosen username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Manual inventory entry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    /// Item name.
    pub name: String,
    /// Item category.
    pub category: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional image path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Listing form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    /// Listing title.
    pub name: String,
    /// Asking price.
    pub price: f64,
    /// Listing category.
    pub category: String,
    /// Pickup location.
    pub location: String,
    /// Image reference.
    pub image: String,
    /// Inventory item being sold, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_id: Option<String>,
}

/// Marketplace query. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceFilters {
    /// Exact category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Inclusive lower price bound, as typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    /// Inclusive upper price bound, as typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    /// Listing status; the server defaults to `available`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `GET /api/inventory` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InventoryPage {
    /// Items, newest first.
    pub inventory: Vec<InventoryItem>,
    /// Item count.
    pub total: usize,
}

/// `GET /api/marketplace` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketplacePage {
    /// Matching listings.
    pub items: Vec<Listing>,
    /// Listing count.
    pub total: usize,
    /// Filters as the server parsed them.
    pub filters_applied: Value,
}

/// Listing mutation result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingChange {
    /// The listing after the change.
    pub marketplace_item: Listing,
    /// The linked inventory item after the change.
    #[serde(default)]
    pub inventory_item: Option<InventoryItem>,
}

/// Result of a room scan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionOutcome {
    /// Server summary line.
    pub message: String,
    /// Detector payload as received by the server.
    pub detection_result: Value,
    /// Items created from the scan.
    pub inventory_items: Vec<InventoryItem>,
    /// Number of items created.
    pub items_added: usize,
    /// Public path of the stored photo.
    pub image_url: String,
}

/// Stored photo without detection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedRoom {
    /// Stored file name.
    pub filename: String,
    /// Public path.
    pub path: String,
}

/// Furniture suggestion for a scanned room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    /// Suggested item.
    pub name: String,
    /// Why it fits.
    pub description: String,
    /// Illustration path.
    pub image: String,
    /// Category it belongs to.
    pub category: String,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// Overall status.
    pub status: String,
    /// Backend connectivity.
    pub backend: String,
    /// Detector connectivity.
    pub ml_service: String,
    /// Detector health payload, when reachable.
    #[serde(default)]
    pub ml_service_details: Option<Value>,
    /// Probe time.
    pub timestamp: String,
}

/// Photo picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
pub(crate) struct InventoryItemEnvelope {
    pub(crate) item: InventoryItem,
}

#[derive(Deserialize)]
pub(crate) struct AccountEnvelope {
    pub(crate) user: User,
}
