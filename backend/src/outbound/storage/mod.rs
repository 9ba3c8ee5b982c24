//! Filesystem image store rooted at the upload directory.
//!
//! All access goes through a `cap_std` directory handle, so writes can never
//! leave the upload directory whatever name they are given.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::{Dir, OpenOptions};
use cap_std::ambient_authority;
use tracing::debug;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{RoomImage, StoredImage, is_plain_file_name};

/// Image store writing into a local directory.
#[derive(Clone)]
pub struct LocalImageStore {
    dir: Arc<Dir>,
}

impl LocalImageStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(root: &Path) -> std::io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }
}

fn write_new(dir: &Dir, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(filename, &options)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(
        &self,
        filename: &str,
        image: &RoomImage,
    ) -> Result<StoredImage, ImageStoreError> {
        if !is_plain_file_name(filename) {
            return Err(ImageStoreError::invalid_name(filename));
        }
        let dir = Arc::clone(&self.dir);
        let name = filename.to_owned();
        let bytes = image.bytes.clone();

        tokio::task::spawn_blocking(move || write_new(&dir, &name, &bytes))
            .await
            .map_err(|error| ImageStoreError::io(error.to_string()))?
            .map_err(|error| ImageStoreError::io(format!("{filename}: {error}")))?;

        debug!(filename, size = image.bytes.len(), "stored room image");
        Ok(StoredImage::new(filename))
    }
}
