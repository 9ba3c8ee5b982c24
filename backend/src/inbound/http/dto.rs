//! JSON bodies shared by several handlers.
//!
//! Domain aggregates stay serde-free; these views fix the camelCase wire
//! shape clients rely on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{InventoryItem, MarketplaceListing, Suggestion, User};

/// Public view of an account; never includes the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_owned(),
            email: user.email().to_owned(),
            created_at: user.created_at(),
        }
    }
}

/// Inventory item as returned by inventory and detection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemBody {
    pub id: String,
    pub user_id: String,
    #[schema(example = "Sofa")]
    pub name: String,
    #[schema(example = "furniture")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/uploads/1700000000000-room.jpg")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[schema(example = "ai_scan")]
    pub detection_method: String,
    #[schema(example = "detected")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&InventoryItem> for InventoryItemBody {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id().to_string(),
            user_id: item.owner().to_string(),
            name: item.name().to_owned(),
            category: item.category().to_owned(),
            description: item.description().map(str::to_owned),
            image_path: item.image_path().map(str::to_owned),
            confidence: item.confidence().map(|c| c.value()),
            bbox: item.bbox().map(|b| b.coordinates().to_vec()),
            detection_method: item.detection_method().as_str().to_owned(),
            status: item.status().as_str().to_owned(),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
        }
    }
}

/// Marketplace listing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingBody {
    pub id: String,
    pub seller_id: String,
    #[schema(example = "Oak chair")]
    pub name: String,
    #[schema(example = 45.0)]
    pub price: f64,
    pub category: String,
    pub location: String,
    pub image: String,
    #[schema(example = "available")]
    pub status: String,
    pub listed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_id: Option<String>,
}

impl From<&MarketplaceListing> for ListingBody {
    fn from(listing: &MarketplaceListing) -> Self {
        Self {
            id: listing.id().to_string(),
            seller_id: listing.seller().to_string(),
            name: listing.name().to_owned(),
            price: listing.price().value(),
            category: listing.category().to_owned(),
            location: listing.location().to_owned(),
            image: listing.image().to_owned(),
            status: listing.status().as_str().to_owned(),
            listed_at: listing.listed_at(),
            inventory_id: listing.inventory_item_id().map(|id| id.to_string()),
        }
    }
}

/// One furniture suggestion after a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuggestionBody {
    #[schema(example = "Minimalist Lamp")]
    pub name: String,
    pub description: String,
    #[schema(example = "/placeholder.jpg")]
    pub image: String,
    #[schema(example = "lighting")]
    pub category: String,
}

impl From<Suggestion> for SuggestionBody {
    fn from(value: Suggestion) -> Self {
        let Suggestion {
            name,
            description,
            image,
            category,
        } = value;
        Self {
            name,
            description,
            image,
            category,
        }
    }
}

/// `{success, message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

impl MessageBody {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::{
        Confidence, DetectionMethod, InventoryItemDraft, InventoryItemId, InventoryStatus, UserId,
    };

    fn item() -> InventoryItem {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        InventoryItem::new(InventoryItemDraft {
            id: InventoryItemId::from_uuid(uuid::Uuid::nil()),
            owner: UserId::from_uuid(uuid::Uuid::nil()),
            name: "Sofa".to_owned(),
            category: "furniture".to_owned(),
            description: None,
            image_path: Some("/uploads/1-room.jpg".to_owned()),
            confidence: Some(Confidence::new(0.5).expect("confidence")),
            bbox: None,
            detection_method: DetectionMethod::AiScan,
            status: InventoryStatus::Detected,
            created_at: at,
            updated_at: at,
        })
        .expect("valid item")
    }

    #[rstest]
    fn item_body_uses_camel_case_and_omits_absent_fields() {
        let value = serde_json::to_value(InventoryItemBody::from(&item())).expect("serialise");
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "userId": "00000000-0000-0000-0000-000000000000",
                "name": "Sofa",
                "category": "furniture",
                "imagePath": "/uploads/1-room.jpg",
                "confidence": 0.5,
                "detectionMethod": "ai_scan",
                "status": "detected",
                "createdAt": "2026-01-02T03:04:05Z",
                "updatedAt": "2026-01-02T03:04:05Z",
            })
        );
    }
}
