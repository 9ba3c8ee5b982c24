//! Reqwest-backed object-detection adapter.
//!
//! This adapter owns transport details only: multipart encoding, per-operation
//! timeouts, HTTP error mapping, and JSON decoding into domain objects.
//! Retrying is left to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::dto::{CategoriesResponseDto, DetectResponseDto};
use crate::domain::ports::{DetectorCatalogue, DetectorHealth, ObjectDetector, ObjectDetectorError};
use crate::domain::{DetectionReport, RoomImage, TRACE_ID_HEADER, TraceId};

const DETECT_FIELD: &str = "file";
const HEALTHY_STATUS: &str = "healthy";

/// Deadlines applied to each detector operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorTimeouts {
    /// Deadline for `POST /detect`.
    pub detect: Duration,
    /// Deadline for `GET /health` and `GET /categories`.
    pub probe: Duration,
}

impl Default for DetectorTimeouts {
    fn default() -> Self {
        Self {
            detect: Duration::from_secs(30),
            probe: Duration::from_secs(5),
        }
    }
}

/// Detector adapter that talks to one detection service.
pub struct HttpObjectDetector {
    client: Client,
    base_url: Url,
    detect_url: Url,
    categories_url: Url,
    health_url: Url,
    timeouts: DetectorTimeouts,
}

fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(path);
    }
    url
}

impl HttpObjectDetector {
    /// Build an adapter for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeouts: DetectorTimeouts) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(timeouts.probe).build()?;
        Ok(Self {
            client,
            detect_url: endpoint(&base_url, "detect"),
            categories_url: endpoint(&base_url, "categories"),
            health_url: endpoint(&base_url, "health"),
            base_url,
            timeouts,
        })
    }

    /// Service root, used in operator-facing error details.
    pub fn location(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    async fn get_json(&self, url: &Url) -> Result<Value, ObjectDetectorError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeouts.probe)
            .send()
            .await
            .map_err(map_send_error)?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ObjectDetectorError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_body_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|error| {
        ObjectDetectorError::decode(format!("invalid detector JSON payload: {error}"))
    })
}

fn image_part(image: &RoomImage) -> Result<Part, ObjectDetectorError> {
    let part = Part::bytes(image.bytes.clone()).file_name(image.original_name.clone());
    match image.content_type.as_deref() {
        Some(content_type) => part.mime_str(content_type).map_err(|error| {
            ObjectDetectorError::decode(format!("unsupported content type {content_type}: {error}"))
        }),
        None => Ok(part),
    }
}

#[async_trait]
impl ObjectDetector for HttpObjectDetector {
    async fn detect(&self, image: &RoomImage) -> Result<DetectionReport, ObjectDetectorError> {
        let form = Form::new().part(DETECT_FIELD, image_part(image)?);
        let mut request = self
            .client
            .post(self.detect_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeouts.detect)
            .multipart(form);
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        let response = request.send().await.map_err(map_send_error)?;

        let raw = read_json(response).await?;
        parse_detection(raw)
    }

    async fn categories(&self) -> Result<DetectorCatalogue, ObjectDetectorError> {
        let raw = self.get_json(&self.categories_url).await?;
        let decoded: CategoriesResponseDto = serde_json::from_value(raw).map_err(|error| {
            ObjectDetectorError::decode(format!("invalid categories payload: {error}"))
        })?;
        Ok(decoded.categories)
    }

    async fn probe(&self) -> Result<DetectorHealth, ObjectDetectorError> {
        let details = self.get_json(&self.health_url).await?;
        Ok(parse_health(details))
    }
}

fn parse_detection(raw: Value) -> Result<DetectionReport, ObjectDetectorError> {
    let decoded: DetectResponseDto = serde_json::from_value(raw.clone()).map_err(|error| {
        ObjectDetectorError::decode(format!("invalid detection payload: {error}"))
    })?;
    let objects = decoded
        .into_domain_objects()
        .map_err(ObjectDetectorError::decode)?;
    Ok(DetectionReport { objects, raw })
}

fn parse_health(details: Value) -> DetectorHealth {
    let healthy = details.get("status").and_then(Value::as_str) == Some(HEALTHY_STATUS);
    DetectorHealth { healthy, details }
}

/// Failure before any response arrived.
///
/// Only connection and send failures mean the service could not be reached;
/// redirect and request-building failures are reported as unusable replies.
fn map_send_error(error: reqwest::Error) -> ObjectDetectorError {
    if error.is_timeout() {
        ObjectDetectorError::timeout(error.to_string())
    } else if error.is_connect() || error.is_request() {
        ObjectDetectorError::unreachable(error.to_string())
    } else {
        ObjectDetectorError::decode(format!("detector request failed: {error}"))
    }
}

/// Failure while reading a response the service already started sending.
fn map_body_error(error: reqwest::Error) -> ObjectDetectorError {
    if error.is_timeout() {
        ObjectDetectorError::timeout(error.to_string())
    } else {
        ObjectDetectorError::decode(format!("detector response body unreadable: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ObjectDetectorError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    ObjectDetectorError::upstream(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "http_detector_tests.rs"]
mod tests;
