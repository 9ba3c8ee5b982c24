//! Scripted object detector for service and HTTP tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::ports::{
    DetectorCatalogue, DetectorHealth, ObjectDetector, ObjectDetectorError,
};
use crate::domain::{BoundingBox, Confidence, DetectedObject, DetectionReport, RoomImage};

/// Build a detected object with a bounding box, as the detector reports it.
pub fn detected_object_payload(name: &str, category: &str, confidence: f64) -> DetectedObject {
    DetectedObject {
        name: name.to_owned(),
        category: category.to_owned(),
        confidence: match Confidence::new(confidence) {
            Ok(confidence) => confidence,
            Err(error) => panic!("invalid confidence in fixture: {error}"),
        },
        bbox: BoundingBox::new([10.0, 20.0, 110.0, 220.0]).ok(),
    }
}

/// Detector that replays queued detection results in order.
///
/// Once the queue is empty every further call yields `Unreachable`.
pub struct ScriptedDetector {
    detections: Mutex<VecDeque<Result<DetectionReport, ObjectDetectorError>>>,
    catalogue: Result<DetectorCatalogue, ObjectDetectorError>,
    health: Result<DetectorHealth, ObjectDetectorError>,
    calls: AtomicUsize,
}

impl Default for ScriptedDetector {
    fn default() -> Self {
        Self {
            detections: Mutex::new(VecDeque::new()),
            catalogue: Err(ObjectDetectorError::unreachable("no catalogue scripted")),
            health: Err(ObjectDetectorError::unreachable("no health scripted")),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful detection of `objects`.
    #[must_use]
    pub fn then_objects(self, objects: Vec<DetectedObject>) -> Self {
        let raw = json!({
            "success": true,
            "objects": objects
                .iter()
                .map(|object| json!({
                    "name": object.name,
                    "category": object.category,
                    "confidence": object.confidence.value(),
                    "bbox": object.bbox.map(|bbox| bbox.coordinates()),
                }))
                .collect::<Vec<Value>>(),
            "total_objects": objects.len(),
        });
        self.then(Ok(DetectionReport { objects, raw }))
    }

    /// Queue an arbitrary detection outcome.
    #[must_use]
    pub fn then(self, outcome: Result<DetectionReport, ObjectDetectorError>) -> Self {
        match self.detections.lock() {
            Ok(mut queue) => queue.push_back(outcome),
            Err(_) => panic!("detector script mutex"),
        }
        self
    }

    #[must_use]
    pub fn with_catalogue(mut self, catalogue: DetectorCatalogue) -> Self {
        self.catalogue = Ok(catalogue);
        self
    }

    #[must_use]
    pub fn healthy(mut self) -> Self {
        self.health = Ok(DetectorHealth {
            healthy: true,
            details: json!({ "status": "healthy", "model_loaded": true }),
        });
        self
    }

    /// Number of `detect` calls made so far.
    pub fn detect_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectDetector for ScriptedDetector {
    async fn detect(&self, _image: &RoomImage) -> Result<DetectionReport, ObjectDetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = match self.detections.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => panic!("detector script mutex"),
        };
        next.unwrap_or_else(|| Err(ObjectDetectorError::unreachable("script exhausted")))
    }

    async fn categories(&self) -> Result<DetectorCatalogue, ObjectDetectorError> {
        self.catalogue.clone()
    }

    async fn probe(&self) -> Result<DetectorHealth, ObjectDetectorError> {
        self.health.clone()
    }
}
