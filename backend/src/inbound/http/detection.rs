//! Room photo upload handlers.
//!
//! ```text
//! POST /api/detect-objects  multipart/form-data; field "image"
//! POST /api/upload-room     multipart/form-data; field "image"
//! ```
//!
//! Both handlers read a single `image` part into memory, bounded by
//! [`UploadLimit`], and hand it to the [`DetectionCommand`] port.
//!
//! [`DetectionCommand`]: crate::domain::ports::DetectionCommand

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, post, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::ports::DetectObjectsRequest;
use crate::domain::{Error, RoomImage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::InventoryItemBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const IMAGE_FIELD: &str = "image";
const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Largest accepted image, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimit(pub usize);

impl Default for UploadLimit {
    fn default() -> Self {
        Self(DEFAULT_UPLOAD_LIMIT)
    }
}

/// Multipart form carrying the room photo. Documentation only.
#[derive(ToSchema)]
#[expect(dead_code, reason = "schema-only type for the OpenAPI document")]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// `{success, message, detection_result, inventory_items, items_added, image_url}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectObjectsResponseBody {
    pub success: bool,
    pub message: String,
    /// Detector payload as received.
    #[schema(value_type = Object)]
    pub detection_result: Value,
    pub inventory_items: Vec<InventoryItemBody>,
    pub items_added: usize,
    #[schema(example = "/uploads/1700000000000-room.jpg")]
    pub image_url: String,
}

/// `{message, filename, path}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadRoomResponse {
    pub message: String,
    pub filename: String,
    pub path: String,
}

fn multipart_error(err: &MultipartError) -> Error {
    Error::invalid_request(format!("invalid multipart body: {err}"))
        .with_details(json!({ "source": "multipart", "code": "malformed_input" }))
}

fn missing_image() -> Error {
    Error::invalid_request("No image uploaded")
        .with_details(json!({ "field": IMAGE_FIELD, "code": "missing_field" }))
}

fn too_large(limit: usize) -> Error {
    Error::invalid_request(format!("image exceeds the {limit} byte upload limit"))
        .with_details(json!({ "field": IMAGE_FIELD, "code": "too_large", "limit": limit }))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| multipart_error(&err))? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the `image` part out of a multipart body; other parts are skipped.
async fn read_image(mut payload: Multipart, limit: usize) -> Result<RoomImage, Error> {
    while let Some(mut field) = payload.try_next().await.map_err(|err| multipart_error(&err))? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let original_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or_default()
            .to_owned();
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = read_field(&mut field, limit).await?;
        if bytes.is_empty() {
            return Err(missing_image());
        }
        debug!(
            original_name = %original_name,
            size = bytes.len(),
            "received room image"
        );
        return Ok(RoomImage {
            original_name,
            content_type,
            bytes,
        });
    }
    Err(missing_image())
}

fn limit_of(limit: Option<&web::Data<UploadLimit>>) -> usize {
    limit.map_or(DEFAULT_UPLOAD_LIMIT, |data| data.0)
}

/// Store a room photo, detect its objects and add them to the inventory.
#[utoipa::path(
    post,
    path = "/api/detect-objects",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Objects detected", body = DetectObjectsResponseBody),
        (status = 400, description = "No image uploaded", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Detector unreachable or timed out", body = ErrorSchema)
    ),
    tags = ["detection"],
    operation_id = "detectObjects"
)]
#[post("/detect-objects")]
pub async fn detect_objects(
    state: web::Data<HttpState>,
    session: SessionContext,
    limit: Option<web::Data<UploadLimit>>,
    payload: Multipart,
) -> ApiResult<web::Json<DetectObjectsResponseBody>> {
    let owner = session.require_user_id()?;
    let image = read_image(payload, limit_of(limit.as_ref())).await?;
    let response = state
        .detection
        .detect_objects(DetectObjectsRequest { owner, image })
        .await?;
    let inventory_items: Vec<InventoryItemBody> =
        response.items.iter().map(InventoryItemBody::from).collect();
    info!(
        user_id = %owner,
        items_added = inventory_items.len(),
        image = %response.image.filename,
        "room scan completed"
    );
    Ok(web::Json(DetectObjectsResponseBody {
        success: true,
        message: "Objects detected successfully".to_owned(),
        detection_result: response.detection,
        items_added: inventory_items.len(),
        inventory_items,
        image_url: response.image.public_path,
    }))
}

/// Store a room photo without running detection.
#[utoipa::path(
    post,
    path = "/api/upload-room",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadRoomResponse),
        (status = 400, description = "No image uploaded", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["detection"],
    operation_id = "uploadRoom"
)]
#[post("/upload-room")]
pub async fn upload_room(
    state: web::Data<HttpState>,
    session: SessionContext,
    limit: Option<web::Data<UploadLimit>>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let image = read_image(payload, limit_of(limit.as_ref())).await?;
    let stored = state.detection.upload_room(image).await?;
    Ok(HttpResponse::Created().json(UploadRoomResponse {
        message: "Image uploaded successfully".to_owned(),
        filename: stored.filename,
        path: stored.public_path,
    }))
}

#[cfg(test)]
#[path = "detection_tests.rs"]
mod tests;
