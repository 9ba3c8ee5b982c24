//! Room scan controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{DetectionOutcome, ImageFile};
use crate::resource::Refetch;

/// Sends a photo for detection.
#[async_trait]
pub trait RoomScanner: Send + Sync {
    /// Upload `image` and return the created items.
    async fn scan(&self, image: ImageFile) -> Result<DetectionOutcome, ClientError>;
}

#[async_trait]
impl RoomScanner for ApiClient {
    async fn scan(&self, image: ImageFile) -> Result<DetectionOutcome, ClientError> {
        self.detect_objects(image).await
    }
}

/// Observable scan state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionState {
    /// Whether a scan is running.
    pub is_detecting: bool,
    /// Outcome of the last successful scan.
    pub result: Option<DetectionOutcome>,
    /// Error from the last failed scan.
    pub error: Option<ClientError>,
}

/// Ends the scan even when its future is dropped.
///
/// Published state is settled before the flag is released, so a scan that
/// starts right afterwards cannot have its `is_detecting` overwritten.
struct InflightGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<DetectionState>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            let was_detecting = state.is_detecting;
            state.is_detecting = false;
            was_detecting
        });
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs one scan at a time and refreshes dependent views afterwards.
pub struct ObjectDetectionController<S> {
    scanner: Arc<S>,
    in_flight: AtomicBool,
    state: watch::Sender<DetectionState>,
    invalidates: Vec<Arc<dyn Refetch>>,
}

impl<S: RoomScanner> ObjectDetectionController<S> {
    /// Controller refreshing `invalidates` after each successful scan.
    pub fn new(scanner: Arc<S>, invalidates: Vec<Arc<dyn Refetch>>) -> Self {
        let (state, _) = watch::channel(DetectionState::default());
        Self {
            scanner,
            in_flight: AtomicBool::new(false),
            state,
            invalidates,
        }
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetectionState> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> DetectionState {
        self.state.borrow().clone()
    }

    /// Scan `image`.
    ///
    /// # Errors
    /// Returns [`ClientError::Busy`] without touching state when a scan is
    /// already running; otherwise the scanner's error, which is also recorded
    /// in state.
    pub async fn detect(&self, image: ImageFile) -> Result<DetectionOutcome, ClientError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy);
        }
        let _guard = InflightGuard {
            flag: &self.in_flight,
            state: &self.state,
        };

        self.state.send_modify(|state| {
            state.is_detecting = true;
            state.error = None;
        });

        let outcome = self.scanner.scan(image).await;
        match &outcome {
            Ok(result) => {
                info!(items = result.items_added, "room scan finished");
                self.state.send_modify(|state| {
                    state.is_detecting = false;
                    state.result = Some(result.clone());
                });
                for view in &self.invalidates {
                    view.refetch();
                }
            }
            Err(error) => {
                warn!(%error, "room scan failed");
                self.state.send_modify(|state| {
                    state.is_detecting = false;
                    state.error = Some(error.clone());
                });
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingView(AtomicUsize);

    impl Refetch for CountingView {
        fn refetch(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct GatedScanner {
        gate: Notify,
        result: Result<DetectionOutcome, ClientError>,
    }

    #[async_trait]
    impl RoomScanner for GatedScanner {
        async fn scan(&self, _image: ImageFile) -> Result<DetectionOutcome, ClientError> {
            self.gate.notified().await;
            self.result.clone()
        }
    }

    fn outcome() -> DetectionOutcome {
        DetectionOutcome {
            message: "Objects detected successfully".into(),
            detection_result: json!({ "objects": [] }),
            inventory_items: Vec::new(),
            items_added: 0,
            image_url: "/uploads/1-room.jpg".into(),
        }
    }

    fn photo() -> ImageFile {
        ImageFile {
            file_name: "room.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xff, 0xd8],
        }
    }

    fn controller(
        result: Result<DetectionOutcome, ClientError>,
    ) -> (Arc<ObjectDetectionController<GatedScanner>>, Arc<CountingView>) {
        let scanner = Arc::new(GatedScanner {
            gate: Notify::new(),
            result,
        });
        let view = Arc::new(CountingView::default());
        let controller = Arc::new(ObjectDetectionController::new(
            scanner,
            vec![view.clone() as Arc<dyn Refetch>],
        ));
        (controller, view)
    }

    #[tokio::test]
    async fn second_scan_while_running_is_refused() {
        let (controller, view) = controller(Ok(outcome()));
        let mut rx = controller.subscribe();

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.detect(photo()).await }
        });
        rx.wait_for(|state| state.is_detecting)
            .await
            .expect("controller alive");

        let second = controller.detect(photo()).await;
        assert_eq!(second, Err(ClientError::Busy));
        assert!(controller.snapshot().is_detecting, "busy call left state alone");

        controller.scanner.gate.notify_one();
        let first = first.await.expect("join");

        assert_eq!(first, Ok(outcome()));
        let state = controller.snapshot();
        assert!(!state.is_detecting);
        assert_eq!(state.result, Some(outcome()));
        assert_eq!(view.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_is_recorded_without_invalidating() {
        let error = ClientError::Api {
            status: 503,
            message: "object detection service unavailable".into(),
            code: Some("service_unavailable".into()),
        };
        let (controller, view) = controller(Err(error.clone()));
        controller.scanner.gate.notify_one();

        let result = controller.detect(photo()).await;

        assert_eq!(result, Err(error.clone()));
        let state = controller.snapshot();
        assert_eq!(state.error, Some(error));
        assert!(!state.is_detecting);
        assert_eq!(view.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_scan_releases_the_guard() {
        let (controller, _view) = controller(Ok(outcome()));

        let pending = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.detect(photo()).await }
        });
        controller
            .subscribe()
            .wait_for(|state| state.is_detecting)
            .await
            .expect("controller alive");
        pending.abort();
        let _aborted = pending.await;

        let state = controller.snapshot();
        assert!(!state.is_detecting, "aborted scan no longer reported as running");
        assert_eq!(state.result, None);

        controller.scanner.gate.notify_one();
        assert_eq!(controller.detect(photo()).await, Ok(outcome()));
    }
}
