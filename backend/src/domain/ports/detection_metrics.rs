//! Domain port surface for detection outcome counters.
//!
//! Keeps detection observability at the domain boundary so the Prometheus
//! adapter can count outcomes without the service knowing about exporters.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording detection metrics.
    pub enum DetectionMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "detection metrics exporter failed: {message}",
    }
}

/// Outcome label for one detection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DetectionOutcomeKind {
    /// Objects were detected and stored.
    Succeeded,
    /// The detector could not be reached.
    Unreachable,
    /// The detector did not answer in time.
    TimedOut,
    /// Every attempt hit a retryable upstream status.
    RetryExhausted,
    /// The detector rejected the request or sent an unusable response.
    Rejected,
    /// Storing the image or the detected items failed.
    PersistenceFailed,
}

impl DetectionOutcomeKind {
    /// Stable label value for exporters.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
            Self::RetryExhausted => "retry_exhausted",
            Self::Rejected => "rejected",
            Self::PersistenceFailed => "persistence_failed",
        }
    }
}

/// Metric payload for one detection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionOutcome {
    pub kind: DetectionOutcomeKind,
    /// Detector calls made, including retries.
    pub attempt_count: u32,
    /// Inventory items created; zero unless the request succeeded.
    pub object_count: usize,
}

/// Metrics recording port for detection requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetectionMetrics: Send + Sync {
    /// Record the outcome of one detection request.
    async fn record(&self, outcome: &DetectionOutcome) -> Result<(), DetectionMetricsError>;
}

/// Metrics adapter used when no exporter is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDetectionMetrics;

#[async_trait]
impl DetectionMetrics for NoOpDetectionMetrics {
    async fn record(&self, _outcome: &DetectionOutcome) -> Result<(), DetectionMetricsError> {
        Ok(())
    }
}
