//! Room photo uploads and the detection gateway.
//!
//! The service stores the upload, asks the detector for objects under the
//! configured [`RetryPolicy`], and records every detected object as an
//! `ai_scan` inventory item in one atomic batch. Unreachable detectors and
//! timeouts fail fast; only transient upstream statuses are retried.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::inventory_service::map_repository_error;
use crate::domain::ports::{
    DetectObjectsRequest, DetectObjectsResponse, DetectionCommand, DetectionMetrics,
    DetectionOutcome, DetectionOutcomeKind, ImageStore, ImageStoreError, InventoryRepository,
    ObjectDetector, ObjectDetectorError,
};
use crate::domain::{
    AttemptJitter, BackoffJitter, DetectedObject, DetectionMethod, DetectionReport, Error,
    InventoryItem, InventoryItemDraft, InventoryItemId, InventoryStatus, RetryPolicy,
    RetrySleeper, RoomImage, StoredImage, TokioSleeper, UserId, stored_file_name,
};

/// Port bundle required by the detection service.
pub struct DetectionServicePorts {
    pub detector: Arc<dyn ObjectDetector>,
    pub images: Arc<dyn ImageStore>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub metrics: Arc<dyn DetectionMetrics>,
}

/// Runtime helpers used by the retry loop.
pub struct DetectionRuntime {
    pub sleeper: Arc<dyn RetrySleeper>,
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for DetectionRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(AttemptJitter),
        }
    }
}

/// Detection service implementing [`DetectionCommand`].
pub struct DetectionService {
    detector: Arc<dyn ObjectDetector>,
    images: Arc<dyn ImageStore>,
    inventory: Arc<dyn InventoryRepository>,
    metrics: Arc<dyn DetectionMetrics>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn RetrySleeper>,
    jitter: Arc<dyn BackoffJitter>,
    policy: RetryPolicy,
    detector_location: String,
}

/// Terminal detector failure together with the attempts it took.
struct FailedDetection {
    error: ObjectDetectorError,
    attempts: u32,
}

impl DetectionService {
    /// Build a service that sleeps with Tokio between retries.
    ///
    /// `detector_location` is quoted back to clients when the detector
    /// cannot be reached.
    pub fn new(
        ports: DetectionServicePorts,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
        detector_location: impl Into<String>,
    ) -> Self {
        Self::with_runtime(
            ports,
            clock,
            DetectionRuntime::default(),
            policy,
            detector_location,
        )
    }

    /// Build a service with injected retry runtime.
    pub fn with_runtime(
        ports: DetectionServicePorts,
        clock: Arc<dyn Clock>,
        runtime: DetectionRuntime,
        policy: RetryPolicy,
        detector_location: impl Into<String>,
    ) -> Self {
        Self {
            detector: ports.detector,
            images: ports.images,
            inventory: ports.inventory,
            metrics: ports.metrics,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            policy,
            detector_location: detector_location.into(),
        }
    }

    async fn store(&self, image: &RoomImage) -> Result<StoredImage, Error> {
        let filename = stored_file_name(
            self.clock.utc().timestamp_millis(),
            Uuid::new_v4(),
            &image.original_name,
        );
        self.images
            .save(&filename, image)
            .await
            .map_err(|err| match err {
                ImageStoreError::InvalidName { name } => {
                    Error::invalid_request(format!("invalid image file name: {name}"))
                }
                ImageStoreError::Io { message } => {
                    Error::internal(format!("failed to store image: {message}"))
                }
            })
    }

    async fn detect_with_retry(
        &self,
        image: &RoomImage,
    ) -> Result<(DetectionReport, u32), FailedDetection> {
        let max_attempts = self.policy.attempts();
        let mut attempt = 1;
        loop {
            match self.detector.detect(image).await {
                Ok(report) => return Ok((report, attempt)),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    let delay = self.jitter.jittered_delay(
                        self.policy.base_delay(attempt),
                        attempt,
                        self.clock.utc(),
                    );
                    debug!(attempt, ?delay, %error, "retrying object detection");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(FailedDetection { error, attempts: attempt }),
            }
        }
    }

    fn map_detection_failure(&self, failure: &FailedDetection) -> (DetectionOutcomeKind, Error) {
        match &failure.error {
            ObjectDetectorError::Unreachable { message } => {
                warn!(%message, location = %self.detector_location, "object detector unreachable");
                (
                    DetectionOutcomeKind::Unreachable,
                    Error::service_unavailable("object detection service unavailable")
                        .with_details(json!({
                            "reason": format!(
                                "Make sure the detection service is running at {}",
                                self.detector_location
                            ),
                            "code": "detector_unreachable",
                        })),
                )
            }
            ObjectDetectorError::Timeout { message } => {
                warn!(%message, "object detection timed out");
                (
                    DetectionOutcomeKind::TimedOut,
                    Error::service_unavailable("object detection timed out")
                        .with_details(json!({ "reason": "timeout", "code": "detector_timeout" })),
                )
            }
            error if error.is_retryable() => {
                error!(%error, attempts = failure.attempts, "object detection retries exhausted");
                (
                    DetectionOutcomeKind::RetryExhausted,
                    Error::internal(format!(
                        "object detection failed after {} attempts: {error}",
                        failure.attempts
                    )),
                )
            }
            error => {
                error!(%error, "object detection rejected");
                (
                    DetectionOutcomeKind::Rejected,
                    Error::internal(format!("object detection failed: {error}")),
                )
            }
        }
    }

    fn build_items(
        &self,
        owner: UserId,
        image: &StoredImage,
        objects: Vec<DetectedObject>,
    ) -> Result<Vec<InventoryItem>, Error> {
        let now = self.clock.utc();
        objects
            .into_iter()
            .map(|object| {
                InventoryItem::new(InventoryItemDraft {
                    id: InventoryItemId::random(),
                    owner,
                    name: object.name,
                    category: object.category,
                    description: None,
                    image_path: Some(image.public_path.clone()),
                    confidence: Some(object.confidence),
                    bbox: object.bbox,
                    detection_method: DetectionMethod::AiScan,
                    status: InventoryStatus::Detected,
                    created_at: now,
                    updated_at: now,
                })
                .map_err(|err| Error::internal(format!("detector returned an unusable object: {err}")))
            })
            .collect()
    }

    async fn record(&self, kind: DetectionOutcomeKind, attempt_count: u32, object_count: usize) {
        let outcome = DetectionOutcome {
            kind,
            attempt_count,
            object_count,
        };
        // Exporter failures never fail the request.
        if let Err(err) = self.metrics.record(&outcome).await {
            debug!(%err, "failed to record detection metrics");
        }
    }
}

#[async_trait]
impl DetectionCommand for DetectionService {
    async fn detect_objects(
        &self,
        request: DetectObjectsRequest,
    ) -> Result<DetectObjectsResponse, Error> {
        let DetectObjectsRequest { owner, image } = request;
        let stored = match self.store(&image).await {
            Ok(stored) => stored,
            Err(err) => {
                self.record(DetectionOutcomeKind::PersistenceFailed, 0, 0).await;
                return Err(err);
            }
        };

        let (report, attempts) = match self.detect_with_retry(&image).await {
            Ok(result) => result,
            Err(failure) => {
                let (kind, err) = self.map_detection_failure(&failure);
                self.record(kind, failure.attempts, 0).await;
                return Err(err);
            }
        };

        let DetectionReport { objects, raw } = report;
        let items = match self.build_items(owner, &stored, objects) {
            Ok(items) => items,
            Err(err) => {
                self.record(DetectionOutcomeKind::Rejected, attempts, 0).await;
                return Err(err);
            }
        };
        if !items.is_empty()
            && let Err(err) = self.inventory.insert_all(&items).await
        {
            self.record(DetectionOutcomeKind::PersistenceFailed, attempts, 0)
                .await;
            return Err(map_repository_error(err));
        }

        self.record(DetectionOutcomeKind::Succeeded, attempts, items.len())
            .await;
        info!(
            owner = %owner,
            image = %stored.filename,
            items = items.len(),
            attempts,
            "stored detected objects"
        );
        Ok(DetectObjectsResponse {
            image: stored,
            items,
            detection: raw,
        })
    }

    async fn upload_room(&self, image: RoomImage) -> Result<StoredImage, Error> {
        let stored = self.store(&image).await?;
        info!(image = %stored.filename, bytes = image.bytes.len(), "stored room image");
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "detection_service_tests.rs"]
mod tests;
