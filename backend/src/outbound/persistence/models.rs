//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence module. Conversions back into the domain
//! re-run domain validation so a corrupted row surfaces as a query error
//! instead of an invalid aggregate.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    BoundingBox, Confidence, EmailAddress, InventoryItem, InventoryItemDraft, InventoryItemId,
    ListingDraft, ListingId, MarketplaceListing, Price, User, UserId, Username,
};

use super::schema::{inventory_items, marketplace_listings, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username(),
            email: user.email(),
            password_hash: user.password_hash(),
            created_at: user.created_at(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username)
            .map_err(|err| format!("corrupted username for user {}: {err}", row.id))?;
        let email = EmailAddress::new(&row.email)
            .map_err(|err| format!("corrupted email for user {}: {err}", row.id))?;
        Ok(User::new(
            UserId::from_uuid(row.id),
            username,
            email,
            row.password_hash,
            row.created_at,
        ))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inventory_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryItemRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub confidence: Option<f64>,
    pub bbox: Option<Vec<f64>>,
    pub detection_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inventory_items)]
pub(crate) struct NewInventoryItemRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub image_path: Option<&'a str>,
    pub confidence: Option<f64>,
    pub bbox: Option<Vec<f64>>,
    pub detection_method: &'static str,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a InventoryItem> for NewInventoryItemRow<'a> {
    fn from(item: &'a InventoryItem) -> Self {
        Self {
            id: *item.id().as_uuid(),
            owner_id: *item.owner().as_uuid(),
            name: item.name(),
            category: item.category(),
            description: item.description(),
            image_path: item.image_path(),
            confidence: item.confidence().map(Confidence::value),
            bbox: item.bbox().map(|bbox| bbox.coordinates().to_vec()),
            detection_method: item.detection_method().as_str(),
            status: item.status().as_str(),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
        }
    }
}

/// Status change applied to one inventory row.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = inventory_items)]
pub(crate) struct InventoryStatusUpdate {
    pub status: &'static str,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InventoryItemRow> for InventoryItem {
    type Error = String;

    fn try_from(row: InventoryItemRow) -> Result<Self, Self::Error> {
        let corrupted = |err: crate::domain::InventoryValidationError| {
            format!("corrupted inventory item {}: {err}", row.id)
        };
        let confidence = row.confidence.map(Confidence::new).transpose().map_err(corrupted)?;
        let bbox = row
            .bbox
            .as_deref()
            .map(BoundingBox::from_slice)
            .transpose()
            .map_err(corrupted)?;
        let detection_method = row.detection_method.parse().map_err(corrupted)?;
        let status = row.status.parse().map_err(corrupted)?;
        let id = row.id;

        InventoryItem::new(InventoryItemDraft {
            id: InventoryItemId::from_uuid(id),
            owner: UserId::from_uuid(row.owner_id),
            name: row.name,
            category: row.category,
            description: row.description,
            image_path: row.image_path,
            confidence,
            bbox,
            detection_method,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .map_err(|err| format!("corrupted inventory item {id}: {err}"))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = marketplace_listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub location: String,
    pub image: String,
    pub status: String,
    pub listed_at: DateTime<Utc>,
    pub inventory_item_id: Option<Uuid>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = marketplace_listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: &'a str,
    pub price: f64,
    pub category: &'a str,
    pub location: &'a str,
    pub image: &'a str,
    pub status: &'static str,
    pub listed_at: DateTime<Utc>,
    pub inventory_item_id: Option<Uuid>,
}

impl<'a> From<&'a MarketplaceListing> for NewListingRow<'a> {
    fn from(listing: &'a MarketplaceListing) -> Self {
        Self {
            id: *listing.id().as_uuid(),
            seller_id: *listing.seller().as_uuid(),
            name: listing.name(),
            price: listing.price().value(),
            category: listing.category(),
            location: listing.location(),
            image: listing.image(),
            status: listing.status().as_str(),
            listed_at: listing.listed_at(),
            inventory_item_id: listing.inventory_item_id().map(|id| *id.as_uuid()),
        }
    }
}

impl TryFrom<ListingRow> for MarketplaceListing {
    type Error = String;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupted = |err: crate::domain::MarketplaceValidationError| {
            format!("corrupted listing {id}: {err}")
        };
        let price = Price::new(row.price).map_err(corrupted)?;
        let status = row.status.parse().map_err(corrupted)?;

        MarketplaceListing::new(ListingDraft {
            id: ListingId::from_uuid(id),
            seller: UserId::from_uuid(row.seller_id),
            name: row.name,
            price,
            category: row.category,
            location: row.location,
            image: row.image,
            status,
            listed_at: row.listed_at,
            inventory_item_id: row.inventory_item_id.map(InventoryItemId::from_uuid),
        })
        .map_err(corrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DetectionMethod, InventoryStatus};
    use rstest::rstest;

    fn row(status: &str) -> InventoryItemRow {
        let now = Utc::now();
        InventoryItemRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Floor lamp".to_owned(),
            category: "lighting".to_owned(),
            description: None,
            image_path: Some("/uploads/1-room.jpg".to_owned()),
            confidence: Some(0.82),
            bbox: Some(vec![1.0, 2.0, 3.0, 4.0]),
            detection_method: "ai_scan".to_owned(),
            status: status.to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn inventory_row_converts_to_domain() {
        let item = InventoryItem::try_from(row("listed")).expect("valid row");
        assert_eq!(item.status(), InventoryStatus::Listed);
        assert_eq!(item.detection_method(), DetectionMethod::AiScan);
        assert_eq!(item.bbox().map(|b| b.coordinates()), Some([1.0, 2.0, 3.0, 4.0]));
    }

    #[rstest]
    fn unknown_status_is_reported_as_corruption() {
        let error = InventoryItem::try_from(row("archived")).expect_err("bad status");
        assert!(error.contains("corrupted inventory item"));
    }

    #[rstest]
    fn insert_row_borrows_item_fields() {
        let item = InventoryItem::try_from(row("detected")).expect("valid row");
        let insert = NewInventoryItemRow::from(&item);
        assert_eq!(insert.status, "detected");
        assert_eq!(insert.bbox.as_deref(), Some([1.0, 2.0, 3.0, 4.0].as_slice()));
    }
}
