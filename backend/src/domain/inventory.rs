//! Inventory items and their status lifecycle.
//!
//! An item is created either by hand or from an AI room scan and then moves
//! through the lifecycle below. `listed` and `sold` are only reachable via the
//! marketplace so a listing and its source item never disagree.
//!
//! ```text
//! detected ─┬─> available <─> used
//!           │       │          │
//!           └───────┴──────────┴─> listed ──> sold
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation failures for inventory values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InventoryValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("confidence must be between 0 and 1, got {value}")]
    ConfidenceOutOfRange { value: f64 },
    #[error("bounding box coordinates must be finite")]
    InvalidBoundingBox,
    #[error("unknown inventory status '{value}'")]
    UnknownStatus { value: String },
    #[error("unknown detection method '{value}'")]
    UnknownDetectionMethod { value: String },
    #[error("invalid inventory item id '{value}'")]
    InvalidId { value: String },
}

/// Opaque server-generated inventory item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(Uuid);

impl InventoryItemId {
    /// Generate a fresh identifier.
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

impl fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InventoryItemId {
    type Err = InventoryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| InventoryValidationError::InvalidId {
                value: s.to_owned(),
            })
    }
}

/// Lifecycle state of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Detected,
    Available,
    Used,
    Listed,
    Sold,
}

impl InventoryStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Detected,
        Self::Available,
        Self::Used,
        Self::Listed,
        Self::Sold,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Available => "available",
            Self::Used => "used",
            Self::Listed => "listed",
            Self::Sold => "sold",
        }
    }

    /// Whether an item in `self` may move to `next`.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::domain::InventoryStatus;
    ///
    /// assert!(InventoryStatus::Detected.can_transition_to(InventoryStatus::Listed));
    /// assert!(!InventoryStatus::Sold.can_transition_to(InventoryStatus::Available));
    /// assert!(!InventoryStatus::Used.can_transition_to(InventoryStatus::Used));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Detected, Self::Available | Self::Used | Self::Listed)
                | (Self::Available, Self::Used | Self::Listed)
                | (Self::Used, Self::Available | Self::Listed)
                | (Self::Listed, Self::Sold)
        )
    }

    /// Statuses owners may set directly; the rest belong to the marketplace.
    #[must_use]
    pub const fn is_owner_settable(self) -> bool {
        matches!(self, Self::Available | Self::Used)
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryStatus {
    type Err = InventoryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InventoryValidationError::UnknownStatus {
                value: s.to_owned(),
            })
    }
}

/// How an item entered the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    #[default]
    Manual,
    AiScan,
}

impl DetectionMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::AiScan => "ai_scan",
        }
    }
}

impl FromStr for DetectionMethod {
    type Err = InventoryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "ai_scan" => Ok(Self::AiScan),
            other => Err(InventoryValidationError::UnknownDetectionMethod {
                value: other.to_owned(),
            }),
        }
    }
}

/// Detector confidence score within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Validate a confidence score.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::domain::Confidence;
    ///
    /// assert!(Confidence::new(0.87).is_ok());
    /// assert!(Confidence::new(1.2).is_err());
    /// assert!(Confidence::new(f64::NAN).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, InventoryValidationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InventoryValidationError::ConfidenceOutOfRange { value })
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Detector bounding box `[x1, y1, x2, y2]` in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundingBox([f64; 4]);

impl BoundingBox {
    /// Validate that every coordinate is finite.
    pub fn new(coordinates: [f64; 4]) -> Result<Self, InventoryValidationError> {
        if coordinates.iter().all(|value| value.is_finite()) {
            Ok(Self(coordinates))
        } else {
            Err(InventoryValidationError::InvalidBoundingBox)
        }
    }

    /// Build a box from a stored slice, rejecting anything but four values.
    pub fn from_slice(values: &[f64]) -> Result<Self, InventoryValidationError> {
        let coordinates: [f64; 4] = values
            .try_into()
            .map_err(|_| InventoryValidationError::InvalidBoundingBox)?;
        Self::new(coordinates)
    }

    #[must_use]
    pub const fn coordinates(&self) -> [f64; 4] {
        self.0
    }
}

/// Raw values used to construct an [`InventoryItem`].
#[derive(Debug, Clone)]
pub struct InventoryItemDraft {
    pub id: InventoryItemId,
    pub owner: UserId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub confidence: Option<Confidence>,
    pub bbox: Option<BoundingBox>,
    pub detection_method: DetectionMethod,
    pub status: InventoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item owned by a user, detected in a room photo or added by hand.
///
/// ## Invariants
/// - `name` and `category` are trimmed and non-empty.
/// - blank optional text fields are stored as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    id: InventoryItemId,
    owner: UserId,
    name: String,
    category: String,
    description: Option<String>,
    image_path: Option<String>,
    confidence: Option<Confidence>,
    bbox: Option<BoundingBox>,
    detection_method: DetectionMethod,
    status: InventoryStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn required_text(
    field: &'static str,
    value: String,
) -> Result<String, InventoryValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryValidationError::EmptyField { field });
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_owned())
    }
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

impl InventoryItem {
    /// Validate a draft into an item.
    pub fn new(draft: InventoryItemDraft) -> Result<Self, InventoryValidationError> {
        let InventoryItemDraft {
            id,
            owner,
            name,
            category,
            description,
            image_path,
            confidence,
            bbox,
            detection_method,
            status,
            created_at,
            updated_at,
        } = draft;

        Ok(Self {
            id,
            owner,
            name: required_text("name", name)?,
            category: required_text("category", category)?,
            description: optional_text(description),
            image_path: optional_text(image_path),
            confidence,
            bbox,
            detection_method,
            status,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> InventoryItemId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    #[must_use]
    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    #[must_use]
    pub fn detection_method(&self) -> DetectionMethod {
        self.detection_method
    }

    #[must_use]
    pub fn status(&self) -> InventoryStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Return a copy moved to `status`, with `updated_at` refreshed.
    ///
    /// Callers are expected to have checked
    /// [`InventoryStatus::can_transition_to`] first.
    #[must_use]
    pub fn with_status(mut self, status: InventoryStatus, at: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> InventoryItemDraft {
        let now = Utc::now();
        InventoryItemDraft {
            id: InventoryItemId::random(),
            owner: UserId::random(),
            name: "  Oak chair ".to_owned(),
            category: "furniture".to_owned(),
            description: Some("   ".to_owned()),
            image_path: None,
            confidence: None,
            bbox: None,
            detection_method: DetectionMethod::Manual,
            status: InventoryStatus::Detected,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn new_trims_name_and_drops_blank_description(draft: InventoryItemDraft) {
        let item = InventoryItem::new(draft).expect("valid draft");
        assert_eq!(item.name(), "Oak chair");
        assert!(item.description().is_none());
    }

    #[rstest]
    #[case::name("name")]
    #[case::category("category")]
    fn new_rejects_blank_required_fields(mut draft: InventoryItemDraft, #[case] field: &str) {
        match field {
            "name" => draft.name = " ".to_owned(),
            _ => draft.category = String::new(),
        }
        let error = InventoryItem::new(draft).expect_err("blank field rejected");
        assert!(matches!(error, InventoryValidationError::EmptyField { field: f } if f == field));
    }

    #[rstest]
    #[case(InventoryStatus::Detected, InventoryStatus::Available, true)]
    #[case(InventoryStatus::Detected, InventoryStatus::Used, true)]
    #[case(InventoryStatus::Detected, InventoryStatus::Listed, true)]
    #[case(InventoryStatus::Detected, InventoryStatus::Sold, false)]
    #[case(InventoryStatus::Available, InventoryStatus::Detected, false)]
    #[case(InventoryStatus::Available, InventoryStatus::Used, true)]
    #[case(InventoryStatus::Used, InventoryStatus::Available, true)]
    #[case(InventoryStatus::Used, InventoryStatus::Listed, true)]
    #[case(InventoryStatus::Listed, InventoryStatus::Available, false)]
    #[case(InventoryStatus::Listed, InventoryStatus::Sold, true)]
    #[case(InventoryStatus::Sold, InventoryStatus::Listed, false)]
    fn lifecycle_transitions(
        #[case] from: InventoryStatus,
        #[case] to: InventoryStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    fn no_status_transitions_to_itself() {
        for status in InventoryStatus::ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[rstest]
    fn status_parses_wire_names() {
        assert_eq!("listed".parse(), Ok(InventoryStatus::Listed));
        assert!("archived".parse::<InventoryStatus>().is_err());
    }

    #[rstest]
    fn detection_method_defaults_to_manual() {
        assert_eq!(DetectionMethod::default(), DetectionMethod::Manual);
        assert_eq!("ai_scan".parse(), Ok(DetectionMethod::AiScan));
    }

    #[rstest]
    fn bounding_box_requires_four_values() {
        assert!(BoundingBox::from_slice(&[1.0, 2.0, 3.0]).is_err());
        let bbox = BoundingBox::from_slice(&[1.0, 2.0, 3.0, 4.0]).expect("four values");
        assert_eq!(bbox.coordinates(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[rstest]
    fn with_status_refreshes_updated_at(draft: InventoryItemDraft) {
        let item = InventoryItem::new(draft).expect("valid draft");
        let later = item.updated_at() + chrono::Duration::seconds(5);
        let moved = item.clone().with_status(InventoryStatus::Available, later);
        assert_eq!(moved.status(), InventoryStatus::Available);
        assert_eq!(moved.updated_at(), later);
        assert_eq!(moved.created_at(), item.created_at());
    }
}
