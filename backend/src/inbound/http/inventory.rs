//! Inventory handlers, all scoped to the session user.
//!
//! ```text
//! GET    /api/inventory
//! POST   /api/inventory {"name":"Lamp","category":"lighting"}
//! GET    /api/inventory/{id}
//! PATCH  /api/inventory/{id}/status {"status":"available"}
//! DELETE /api/inventory/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateInventoryItemRequest, UpdateInventoryStatusRequest};
use crate::domain::{Confidence, DetectionMethod, Error, InventoryItemId, InventoryStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::InventoryItemBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_uuid, required_text,
};

const ITEM_ID: FieldName = FieldName::new("id");

/// Manual inventory entry.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    /// `manual` (default) or `ai_scan`.
    pub detection_method: Option<String>,
    pub image_path: Option<String>,
}

/// Requested lifecycle status.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "available")]
    pub status: Option<String>,
}

/// `{success, inventory, total}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryListResponse {
    pub success: bool,
    pub inventory: Vec<InventoryItemBody>,
    pub total: usize,
}

/// `{success, item, message?}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryItemResponse {
    pub success: bool,
    pub item: InventoryItemBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InventoryItemResponse {
    fn new(item: InventoryItemBody) -> Self {
        Self {
            success: true,
            item,
            message: None,
        }
    }
}

fn item_id(raw: &str) -> Result<InventoryItemId, Error> {
    parse_uuid(raw, ITEM_ID).map(InventoryItemId::from_uuid)
}

fn parse_create(
    request: CreateItemRequest,
    owner: crate::domain::UserId,
) -> Result<CreateInventoryItemRequest, Error> {
    let name = required_text(request.name, FieldName::new("name"))?;
    let category = required_text(request.category, FieldName::new("category"))?;
    let confidence = request
        .confidence
        .map(Confidence::new)
        .transpose()
        .map_err(|err| invalid_value_error(FieldName::new("confidence"), err.to_string()))?;
    let detection_method = match request.detection_method.as_deref().map(str::trim) {
        None | Some("") => DetectionMethod::Manual,
        Some(raw) => DetectionMethod::from_str(raw).map_err(|err| {
            invalid_value_error(FieldName::new("detectionMethod"), err.to_string())
        })?,
    };
    Ok(CreateInventoryItemRequest {
        owner,
        name,
        category,
        description: request.description,
        image_path: request.image_path,
        confidence,
        detection_method,
    })
}

/// List the session user's items, newest first.
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Owned items", body = InventoryListResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "listInventory"
)]
#[get("/inventory")]
pub async fn list_items(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<InventoryListResponse>> {
    let owner = session.require_user_id()?;
    let items = state.inventory_query.list_items(&owner).await?;
    let inventory: Vec<InventoryItemBody> = items.iter().map(InventoryItemBody::from).collect();
    Ok(web::Json(InventoryListResponse {
        success: true,
        total: inventory.len(),
        inventory,
    }))
}

/// Add an item by hand; it starts as `detected`.
#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = InventoryItemResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "createInventoryItem"
)]
#[post("/inventory")]
pub async fn create_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateItemRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let request = parse_create(payload.into_inner(), owner)?;
    let item = state.inventory.create_item(request).await?;
    Ok(HttpResponse::Created().json(InventoryItemResponse {
        message: Some("Item added to inventory".to_owned()),
        ..InventoryItemResponse::new(InventoryItemBody::from(&item))
    }))
}

/// Fetch one owned item.
#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = String, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Item", body = InventoryItemResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such item for this user", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "getInventoryItem"
)]
#[get("/inventory/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InventoryItemResponse>> {
    let owner = session.require_user_id()?;
    let id = item_id(&path)?;
    let item = state.inventory_query.get_item(&owner, &id).await?;
    Ok(web::Json(InventoryItemResponse::new(InventoryItemBody::from(
        &item,
    ))))
}

/// Move an owned item along the lifecycle.
#[utoipa::path(
    patch,
    path = "/api/inventory/{id}/status",
    params(("id" = String, Path, description = "Inventory item id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated item", body = InventoryItemResponse),
        (status = 400, description = "Unknown or reserved status", body = ErrorSchema),
        (status = 404, description = "No such item for this user", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "updateInventoryStatus"
)]
#[patch("/inventory/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<web::Json<InventoryItemResponse>> {
    let owner = session.require_user_id()?;
    let id = item_id(&path)?;
    let field = FieldName::new("status");
    let raw = payload
        .into_inner()
        .status
        .ok_or_else(|| missing_field_error(field))?;
    let status = InventoryStatus::from_str(raw.trim())
        .map_err(|err| invalid_value_error(field, err.to_string()))?;
    let item = state
        .inventory
        .update_status(UpdateInventoryStatusRequest { owner, id, status })
        .await?;
    Ok(web::Json(InventoryItemResponse::new(InventoryItemBody::from(
        &item,
    ))))
}

/// Permanently remove an owned item.
#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = String, Path, description = "Inventory item id")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "No such item for this user", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "deleteInventoryItem"
)]
#[delete("/inventory/{id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = item_id(&path)?;
    state.inventory.delete_item(&owner, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
