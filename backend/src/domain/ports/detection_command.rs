//! Driving port for room photo uploads and object detection.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Error, InventoryItem, RoomImage, StoredImage, UserId};

/// Image to analyse on behalf of `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectObjectsRequest {
    pub owner: UserId,
    pub image: RoomImage,
}

/// Stored image, created inventory items and the detector payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectObjectsResponse {
    pub image: StoredImage,
    pub items: Vec<InventoryItem>,
    pub detection: Value,
}

/// Upload use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetectionCommand: Send + Sync {
    /// Store the image, detect objects and add them to the inventory.
    async fn detect_objects(
        &self,
        request: DetectObjectsRequest,
    ) -> Result<DetectObjectsResponse, Error>;

    /// Store a room photo without running detection.
    async fn upload_room(&self, image: RoomImage) -> Result<StoredImage, Error>;
}
