//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP handler, the request/response bodies they
//! exchange, and the session cookie security scheme. Domain types do not
//! derive `ToSchema`; the wrappers in [`crate::inbound::http::schemas`] stand
//! in for them. Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::detection::{
    DetectObjectsResponseBody, ImageUploadForm, UploadRoomResponse,
};
use crate::inbound::http::dto::{
    InventoryItemBody, ListingBody, MessageBody, SuggestionBody, UserBody,
};
use crate::inbound::http::health::{PingBody, ServiceHealthBody};
use crate::inbound::http::inventory::{
    CreateItemRequest, InventoryItemResponse, InventoryListResponse, UpdateStatusRequest,
};
use crate::inbound::http::marketplace::{
    CreateListingBody, FiltersApplied, ListingMutationResponse, MarketplaceListResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{AccountResponse, LoginRequest, RegisterRequest};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Redecor backend API",
        description = "Room scanning, personal inventory and marketplace endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::health::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::service_health,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::inventory::list_items,
        crate::inbound::http::inventory::create_item,
        crate::inbound::http::inventory::get_item,
        crate::inbound::http::inventory::update_status,
        crate::inbound::http::inventory::delete_item,
        crate::inbound::http::marketplace::list_listings,
        crate::inbound::http::marketplace::create_listing,
        crate::inbound::http::marketplace::mark_sold,
        crate::inbound::http::detection::detect_objects,
        crate::inbound::http::detection::upload_room,
        crate::inbound::http::suggestions::scan_result,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserBody,
        InventoryItemBody,
        ListingBody,
        SuggestionBody,
        MessageBody,
        PingBody,
        ServiceHealthBody,
        RegisterRequest,
        LoginRequest,
        AccountResponse,
        CreateItemRequest,
        UpdateStatusRequest,
        InventoryListResponse,
        InventoryItemResponse,
        CreateListingBody,
        FiltersApplied,
        MarketplaceListResponse,
        ListingMutationResponse,
        ImageUploadForm,
        DetectObjectsResponseBody,
        UploadRoomResponse,
    )),
    tags(
        (name = "health", description = "Liveness, readiness and dependency status"),
        (name = "users", description = "Registration and session login"),
        (name = "inventory", description = "The signed-in user's items"),
        (name = "marketplace", description = "Public listings and selling"),
        (name = "detection", description = "Room photo uploads and suggestions")
    )
)]
pub struct ApiDoc;
