//! Marketplace handlers.
//!
//! ```text
//! GET  /api/marketplace?category=furniture&minPrice=10&maxPrice=50&status=available
//! POST /api/marketplace {"name":"Oak chair","price":45,"category":"furniture",
//!                        "location":"Leeds","image":"/uploads/1-room.jpg","inventoryId":"..."}
//! POST /api/marketplace/{id}/sold
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreateListingRequest;
use crate::domain::{
    Error, InventoryItemId, ListingFilter, ListingId, ListingStatus, MarketplaceValidationError,
    Price, PriceRange,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{InventoryItemBody, ListingBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_uuid, required_text,
};

const PRICE: FieldName = FieldName::new("price");
const MIN_PRICE: FieldName = FieldName::new("minPrice");
const MAX_PRICE: FieldName = FieldName::new("maxPrice");
const STATUS: FieldName = FieldName::new("status");

/// Browse filters; blank values are ignored.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MarketplaceQueryParams {
    /// Exact category match.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
    /// `available` (default) or `sold`.
    pub status: Option<String>,
}

/// Filters actually applied to a browse request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FiltersApplied {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: String,
}

/// `{success, items, total, filters_applied}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketplaceListResponse {
    pub success: bool,
    pub items: Vec<ListingBody>,
    pub total: usize,
    pub filters_applied: FiltersApplied,
}

/// New listing; `inventoryId` links it to an owned inventory item.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingBody {
    pub name: Option<String>,
    /// Positive number, or a numeric string.
    #[schema(value_type = Option<f64>, example = 45.0)]
    pub price: Option<Value>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub inventory_id: Option<String>,
}

/// Listing plus the inventory item it changed, if any.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingMutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub marketplace_item: ListingBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_item: Option<InventoryItemBody>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_bound(value: Option<String>, field: FieldName) -> Result<Option<f64>, Error> {
    non_blank(value)
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| invalid_value_error(field, format!("{} must be a number", field.as_str())))
        })
        .transpose()
}

fn map_range_error(error: &MarketplaceValidationError) -> Error {
    let field = match error {
        MarketplaceValidationError::InvalidPriceBound { bound, .. } if *bound == "maxPrice" => {
            MAX_PRICE
        }
        _ => MIN_PRICE,
    };
    invalid_value_error(field, error.to_string())
}

fn parse_filter(params: MarketplaceQueryParams) -> Result<(ListingFilter, FiltersApplied), Error> {
    let category = non_blank(params.category);
    let min = parse_bound(params.min_price, MIN_PRICE)?;
    let max = parse_bound(params.max_price, MAX_PRICE)?;
    let price = PriceRange::new(min, max).map_err(|err| map_range_error(&err))?;
    let status = match non_blank(params.status) {
        Some(raw) => ListingStatus::from_str(&raw)
            .map_err(|err| invalid_value_error(STATUS, err.to_string()))?,
        None => ListingStatus::Available,
    };
    let applied = FiltersApplied {
        category: category.clone(),
        min_price: price.min(),
        max_price: price.max(),
        status: status.as_str().to_owned(),
    };
    Ok((
        ListingFilter {
            category,
            price,
            status,
        },
        applied,
    ))
}

fn parse_price(value: Option<Value>) -> Result<Price, Error> {
    let amount = match value {
        None | Some(Value::Null) => return Err(missing_field_error(PRICE)),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err(missing_field_error(PRICE));
        }
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .ok_or_else(|| invalid_value_error(PRICE, "price must be a number"))?;
    Price::new(amount).map_err(|err| invalid_value_error(PRICE, err.to_string()))
}

fn parse_create(
    body: CreateListingBody,
    seller: crate::domain::UserId,
) -> Result<CreateListingRequest, Error> {
    let name = required_text(body.name, FieldName::new("name"))?;
    let price = parse_price(body.price)?;
    let category = required_text(body.category, FieldName::new("category"))?;
    let location = required_text(body.location, FieldName::new("location"))?;
    let image = required_text(body.image, FieldName::new("image"))?;
    let inventory_item_id = non_blank(body.inventory_id)
        .map(|raw| parse_uuid(&raw, FieldName::new("inventoryId")).map(InventoryItemId::from_uuid))
        .transpose()?;
    Ok(CreateListingRequest {
        seller,
        name,
        price,
        category,
        location,
        image,
        inventory_item_id,
    })
}

/// Browse listings, newest first.
#[utoipa::path(
    get,
    path = "/api/marketplace",
    params(MarketplaceQueryParams),
    responses(
        (status = 200, description = "Matching listings", body = MarketplaceListResponse),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["marketplace"],
    operation_id = "listMarketplace",
    security([])
)]
#[get("/marketplace")]
pub async fn list_listings(
    state: web::Data<HttpState>,
    query: web::Query<MarketplaceQueryParams>,
) -> ApiResult<web::Json<MarketplaceListResponse>> {
    let (filter, filters_applied) = parse_filter(query.into_inner())?;
    let listings = state.marketplace_query.list_listings(&filter).await?;
    let items: Vec<ListingBody> = listings.iter().map(ListingBody::from).collect();
    Ok(web::Json(MarketplaceListResponse {
        success: true,
        total: items.len(),
        items,
        filters_applied,
    }))
}

/// Publish a listing; with `inventoryId` the item becomes `listed` atomically.
#[utoipa::path(
    post,
    path = "/api/marketplace",
    request_body = CreateListingBody,
    responses(
        (status = 201, description = "Listing created", body = ListingMutationResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Inventory item not found", body = ErrorSchema),
        (status = 409, description = "Inventory item cannot be listed", body = ErrorSchema)
    ),
    tags = ["marketplace"],
    operation_id = "createListing"
)]
#[post("/marketplace")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListingBody>,
) -> ApiResult<HttpResponse> {
    let seller = session.require_user_id()?;
    let request = parse_create(payload.into_inner(), seller)?;
    let created = state.marketplace.create_listing(request).await?;
    Ok(HttpResponse::Created().json(ListingMutationResponse {
        success: true,
        message: Some("Item added to marketplace!".to_owned()),
        marketplace_item: ListingBody::from(&created.listing),
        inventory_item: created.inventory_item.as_ref().map(InventoryItemBody::from),
    }))
}

/// Mark the seller's listing, and its inventory item, as sold.
#[utoipa::path(
    post,
    path = "/api/marketplace/{id}/sold",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing sold", body = ListingMutationResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such listing for this seller", body = ErrorSchema),
        (status = 409, description = "Listing already sold", body = ErrorSchema)
    ),
    tags = ["marketplace"],
    operation_id = "markListingSold"
)]
#[post("/marketplace/{id}/sold")]
pub async fn mark_sold(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingMutationResponse>> {
    let seller = session.require_user_id()?;
    let id = parse_uuid(&path, FieldName::new("id")).map(ListingId::from_uuid)?;
    let sold = state.marketplace.mark_sold(&seller, &id).await?;
    Ok(web::Json(ListingMutationResponse {
        success: true,
        message: None,
        marketplace_item: ListingBody::from(&sold.listing),
        inventory_item: sold.item.as_ref().map(InventoryItemBody::from),
    }))
}

#[cfg(test)]
#[path = "marketplace_tests.rs"]
mod tests;
