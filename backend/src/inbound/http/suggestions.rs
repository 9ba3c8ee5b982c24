//! Post-scan furniture suggestions.
//!
//! ```text
//! GET /api/scan-result/1700000000000-room.jpg
//! ```

use actix_web::{get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::SuggestionBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Up to three suggestions for a scanned room image.
#[utoipa::path(
    get,
    path = "/api/scan-result/{filename}",
    params(("filename" = String, Path, description = "Stored image file name")),
    responses(
        (status = 200, description = "Suggestions", body = [SuggestionBody]),
        (status = 400, description = "Unsafe file name", body = ErrorSchema)
    ),
    tags = ["detection"],
    operation_id = "scanSuggestions",
    security([])
)]
#[get("/scan-result/{filename}")]
pub async fn scan_result(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SuggestionBody>>> {
    let suggestions = state.suggestions.suggestions_for(&path).await?;
    Ok(web::Json(
        suggestions.into_iter().map(SuggestionBody::from).collect(),
    ))
}
