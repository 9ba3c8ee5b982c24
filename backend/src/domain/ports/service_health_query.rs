//! Driving port for reporting dependency health.

use async_trait::async_trait;
use serde_json::Value;

/// Connectivity of the detection service.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorStatus {
    pub connected: bool,
    /// Health payload from the detector when it answered.
    pub details: Option<Value>,
}

/// Dependency health for `/api/health`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceHealthQuery: Send + Sync {
    /// Probe the detector; failures are reported as disconnected.
    async fn detector_status(&self) -> DetectorStatus;
}
