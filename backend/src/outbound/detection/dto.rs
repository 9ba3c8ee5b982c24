//! DTOs for decoding detection-service JSON responses.
//!
//! Detector output is loosely shaped; missing labels fall back to the domain
//! defaults here so the domain only ever sees normalised objects.

use serde::Deserialize;
use tracing::warn;

use crate::domain::ports::DetectorCatalogue;
use crate::domain::{
    BoundingBox, Confidence, DetectedObject, UNKNOWN_OBJECT_CATEGORY, UNKNOWN_OBJECT_NAME,
};

#[derive(Debug, Deserialize)]
pub(super) struct DetectResponseDto {
    #[serde(default)]
    pub(super) objects: Vec<DetectedObjectDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DetectedObjectDto {
    pub(super) name: Option<String>,
    pub(super) category: Option<String>,
    pub(super) confidence: Option<f64>,
    pub(super) bbox: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoriesResponseDto {
    #[serde(default)]
    pub(super) categories: DetectorCatalogue,
}

impl DetectResponseDto {
    pub(super) fn into_domain_objects(self) -> Result<Vec<DetectedObject>, String> {
        self.objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| object.into_domain_object(index))
            .collect()
    }
}

fn label_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

impl DetectedObjectDto {
    fn into_domain_object(self, index: usize) -> Result<DetectedObject, String> {
        let confidence = Confidence::new(self.confidence.unwrap_or(0.0))
            .map_err(|error| format!("object {index}: {error}"))?;
        let bbox = match self.bbox.as_deref().map(BoundingBox::from_slice) {
            Some(Ok(bbox)) => Some(bbox),
            Some(Err(error)) => {
                warn!(index, %error, "dropping malformed bounding box from detector");
                None
            }
            None => None,
        };

        Ok(DetectedObject {
            name: label_or(self.name, UNKNOWN_OBJECT_NAME),
            category: label_or(self.category, UNKNOWN_OBJECT_CATEGORY),
            confidence,
            bbox,
        })
    }
}
