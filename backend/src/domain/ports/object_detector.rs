//! Port abstraction for the external object-detection service.
//!
//! Adapters own transport concerns (timeouts, multipart encoding, JSON
//! decoding) and report failures through [`ObjectDetectorError`]. Retrying is
//! a domain decision driven by [`ObjectDetectorError::is_retryable`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DetectionReport, RoomImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised while talking to the detection service.
    pub enum ObjectDetectorError {
        /// No response was received: connection refused, DNS failure and so on.
        Unreachable { message: String } => "detection service unreachable: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } => "detection service timed out: {message}",
        /// The service answered with a non-success status.
        Upstream { status: u16, message: String } =>
            "detection service returned status {status}: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "detection service response was invalid: {message}",
    }
}

impl ObjectDetectorError {
    /// Whether a later attempt may succeed.
    ///
    /// Only transient upstream statuses qualify. Unreachable services and
    /// timeouts fail fast.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::domain::ports::ObjectDetectorError;
    ///
    /// assert!(ObjectDetectorError::upstream(503_u16, "busy").is_retryable());
    /// assert!(!ObjectDetectorError::upstream(400_u16, "bad image").is_retryable());
    /// assert!(!ObjectDetectorError::unreachable("refused").is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if matches!(status, 429 | 502 | 503 | 504))
    }
}

/// Detector health as reported by its own health endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorHealth {
    /// Whether the service reported itself healthy.
    pub healthy: bool,
    /// Payload returned by the service, passed through to clients.
    pub details: Value,
}

/// Object categories the detector knows, mapped to example item labels.
pub type DetectorCatalogue = BTreeMap<String, Vec<String>>;

/// Client for the object-detection service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Run detection on one image.
    async fn detect(&self, image: &RoomImage) -> Result<DetectionReport, ObjectDetectorError>;

    /// Fetch the category catalogue.
    async fn categories(&self) -> Result<DetectorCatalogue, ObjectDetectorError>;

    /// Query the service health endpoint.
    async fn probe(&self) -> Result<DetectorHealth, ObjectDetectorError>;
}
