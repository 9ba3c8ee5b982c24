//! Room photo uploads and the objects a detector finds in them.

use serde_json::Value;
use uuid::Uuid;

use super::{BoundingBox, Confidence};

/// Name given to objects the detector could not label.
pub const UNKNOWN_OBJECT_NAME: &str = "Unknown Object";
/// Category given to objects the detector could not classify.
pub const UNKNOWN_OBJECT_CATEGORY: &str = "miscellaneous";
/// Public URL prefix for stored room images.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const FALLBACK_FILE_NAME: &str = "image";

/// Uploaded room photo awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomImage {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Image persisted by an [`crate::domain::ports::ImageStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub public_path: String,
}

impl StoredImage {
    /// Describe an image saved under `filename`.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let public_path = format!("{UPLOADS_URL_PREFIX}/{filename}");
        Self {
            filename,
            public_path,
        }
    }
}

/// One object reported by the detector, normalised for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub name: String,
    pub category: String,
    pub confidence: Confidence,
    pub bbox: Option<BoundingBox>,
}

/// Detector output: normalised objects plus the payload as received.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub objects: Vec<DetectedObject>,
    pub raw: Value,
}

/// Reduce an uploaded file name to a safe single path segment.
///
/// Characters outside `[A-Za-z0-9._-]` become `_` and leading dots are
/// stripped so the result can never escape the upload directory.
///
/// # Examples
/// ```
/// use redecor_backend::domain::sanitise_file_name;
///
/// assert_eq!(sanitise_file_name("../../etc/passwd"), "_.._etc_passwd");
/// assert_eq!(sanitise_file_name("living room.JPG"), "living_room.JPG");
/// assert_eq!(sanitise_file_name(""), "image");
/// ```
#[must_use]
pub fn sanitise_file_name(original: &str) -> String {
    let replaced: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_start_matches('.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Build the stored file name `{unix_millis}-{nonce}-{sanitised original}`.
///
/// `nonce` contributes its first eight hex digits, so uploads of the same
/// name in the same millisecond still get distinct files.
///
/// # Examples
/// ```
/// use redecor_backend::domain::stored_file_name;
/// use uuid::Uuid;
///
/// let nonce = Uuid::parse_str("9f1c2d3e-0000-4000-8000-000000000000").expect("uuid");
/// assert_eq!(stored_file_name(1_700_000_000_000, nonce, "room.png"), "1700000000000-9f1c2d3e-room.png");
/// ```
#[must_use]
pub fn stored_file_name(unix_millis: i64, nonce: Uuid, original: &str) -> String {
    let simple = nonce.simple().to_string();
    let short = simple.get(..8).unwrap_or(&simple);
    format!("{unix_millis}-{short}-{}", sanitise_file_name(original))
}

/// Whether `name` is safe to resolve inside the upload directory.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && sanitise_file_name(name) == name
}
