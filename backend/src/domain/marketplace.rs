//! Marketplace listings and browse filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::required_text;
use super::{InventoryItemId, UserId};

/// Validation failures for marketplace values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarketplaceValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("price must be a positive number, got {value}")]
    InvalidPrice { value: f64 },
    #[error("{bound} must be a non-negative number, got {value}")]
    InvalidPriceBound { bound: &'static str, value: f64 },
    #[error("minPrice ({min}) must not exceed maxPrice ({max})")]
    InvertedPriceRange { min: f64, max: f64 },
    #[error("unknown listing status '{value}'")]
    UnknownStatus { value: String },
    #[error("invalid listing id '{value}'")]
    InvalidId { value: String },
}

fn listing_text(field: &'static str, value: String) -> Result<String, MarketplaceValidationError> {
    required_text(field, value).map_err(|_| MarketplaceValidationError::EmptyField { field })
}

/// Opaque server-generated listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListingId {
    type Err = MarketplaceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| MarketplaceValidationError::InvalidId {
                value: s.to_owned(),
            })
    }
}

/// Whether a listing can still be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Available,
    Sold,
}

impl ListingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = MarketplaceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            other => Err(MarketplaceValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Asking price; finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Validate a price.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::domain::Price;
    ///
    /// assert_eq!(Price::new(49.5).map(Price::value), Ok(49.5));
    /// assert!(Price::new(0.0).is_err());
    /// assert!(Price::new(f64::INFINITY).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, MarketplaceValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(MarketplaceValidationError::InvalidPrice { value })
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Inclusive price bounds composed from optional minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceRange {
    /// Build a range, rejecting negative, non-finite, or inverted bounds.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::domain::{Price, PriceRange};
    ///
    /// let range = PriceRange::new(Some(10.0), Some(20.0)).expect("valid range");
    /// assert!(range.contains(Price::new(10.0).expect("price")));
    /// assert!(range.contains(Price::new(20.0).expect("price")));
    /// assert!(!range.contains(Price::new(20.01).expect("price")));
    /// assert!(PriceRange::new(Some(30.0), Some(20.0)).is_err());
    /// ```
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, MarketplaceValidationError> {
        for (bound, value) in [("minPrice", min), ("maxPrice", max)] {
            if let Some(value) = value
                && (!value.is_finite() || value < 0.0)
            {
                return Err(MarketplaceValidationError::InvalidPriceBound { bound, value });
            }
        }
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(MarketplaceValidationError::InvertedPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> Option<f64> {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Option<f64> {
        self.max
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `price` falls within both bounds (inclusive).
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let value = price.value();
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Filters applied when browsing the marketplace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub price: PriceRange,
    pub status: ListingStatus,
}

impl ListingFilter {
    /// Whether `listing` satisfies every filter.
    #[must_use]
    pub fn matches(&self, listing: &MarketplaceListing) -> bool {
        listing.status() == self.status
            && self
                .category
                .as_deref()
                .is_none_or(|category| listing.category() == category)
            && self.price.contains(listing.price())
    }
}

/// Raw values used to construct a [`MarketplaceListing`].
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub id: ListingId,
    pub seller: UserId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub location: String,
    pub image: String,
    pub status: ListingStatus,
    pub listed_at: DateTime<Utc>,
    pub inventory_item_id: Option<InventoryItemId>,
}

/// Item offered for sale.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketplaceListing {
    id: ListingId,
    seller: UserId,
    name: String,
    price: Price,
    category: String,
    location: String,
    image: String,
    status: ListingStatus,
    listed_at: DateTime<Utc>,
    inventory_item_id: Option<InventoryItemId>,
}

impl MarketplaceListing {
    /// Validate a draft; every text field is required.
    pub fn new(draft: ListingDraft) -> Result<Self, MarketplaceValidationError> {
        let ListingDraft {
            id,
            seller,
            name,
            price,
            category,
            location,
            image,
            status,
            listed_at,
            inventory_item_id,
        } = draft;

        Ok(Self {
            id,
            seller,
            name: listing_text("name", name)?,
            price,
            category: listing_text("category", category)?,
            location: listing_text("location", location)?,
            image: listing_text("image", image)?,
            status,
            listed_at,
            inventory_item_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> ListingId {
        self.id
    }

    #[must_use]
    pub fn seller(&self) -> UserId {
        self.seller
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn status(&self) -> ListingStatus {
        self.status
    }

    #[must_use]
    pub fn listed_at(&self) -> DateTime<Utc> {
        self.listed_at
    }

    #[must_use]
    pub fn inventory_item_id(&self) -> Option<InventoryItemId> {
        self.inventory_item_id
    }

    #[must_use]
    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    /// Drop the link to a deleted inventory item.
    #[must_use]
    pub fn without_inventory_item(mut self) -> Self {
        self.inventory_item_id = None;
        self
    }
}
