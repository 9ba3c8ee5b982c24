//! Dependency health reporting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{DetectorStatus, ObjectDetector, ServiceHealthQuery};

/// Reports detector connectivity for `/api/health`.
#[derive(Clone)]
pub struct HealthService<D: ?Sized> {
    detector: Arc<D>,
}

impl<D: ?Sized> HealthService<D> {
    pub fn new(detector: Arc<D>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl<D> ServiceHealthQuery for HealthService<D>
where
    D: ObjectDetector + ?Sized,
{
    async fn detector_status(&self) -> DetectorStatus {
        match self.detector.probe().await {
            Ok(health) => DetectorStatus {
                connected: health.healthy,
                details: Some(health.details),
            },
            Err(err) => {
                debug!(%err, "detector health probe failed");
                DetectorStatus {
                    connected: false,
                    details: None,
                }
            }
        }
    }
}
