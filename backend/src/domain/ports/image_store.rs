//! Port abstraction for persisting uploaded room images.

use async_trait::async_trait;

use crate::domain::{RoomImage, StoredImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The file could not be written.
        Io { message: String } => "image store write failed: {message}",
        /// The requested name is not a single plain path segment.
        InvalidName { name: String } => "invalid image file name: {name}",
    }
}

/// Storage for uploaded images, served back under `/uploads`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `image` under `filename`, replacing nothing that already exists.
    async fn save(&self, filename: &str, image: &RoomImage)
    -> Result<StoredImage, ImageStoreError>;
}
