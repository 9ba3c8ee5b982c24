//! Route table for the `/api` scope.

use actix_web::web;

use super::{detection, health, inventory, marketplace, suggestions, users};

/// Register every `/api` handler on `cfg`.
///
/// Probe endpoints (`/health`, `/health/ready`, `/health/live`) sit outside
/// the scope and are mounted by the server.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::service_health)
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(inventory::list_items)
            .service(inventory::create_item)
            .service(inventory::get_item)
            .service(inventory::update_status)
            .service(inventory::delete_item)
            .service(marketplace::list_listings)
            .service(marketplace::create_listing)
            .service(marketplace::mark_sold)
            .service(detection::detect_objects)
            .service(detection::upload_room)
            .service(suggestions::scan_result),
    );
}
