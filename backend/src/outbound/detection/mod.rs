//! Detection-service outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ObjectDetector`
//! port.

mod dto;
mod http_detector;

pub use http_detector::{DetectorTimeouts, HttpObjectDetector};
