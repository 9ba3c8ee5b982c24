//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use mockable::DefaultClock;

use crate::domain::ports::{
    MockAccountCommand, MockDetectionCommand, MockInventoryCommand, MockInventoryQuery,
    MockMarketplaceCommand, MockMarketplaceQuery, MockServiceHealthQuery, MockSuggestionQuery,
};
use crate::domain::{
    DetectionMethod, Error, InventoryItem, InventoryItemDraft, InventoryItemId, InventoryStatus,
    ListingDraft, ListingId, ListingStatus, MarketplaceListing, Price, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

const SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per call and disables the `Secure` flag for local
/// HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set on `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Mock ports with no expectations; handlers under test configure the ones
/// they call.
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub inventory: MockInventoryCommand,
    pub inventory_query: MockInventoryQuery,
    pub marketplace: MockMarketplaceCommand,
    pub marketplace_query: MockMarketplaceQuery,
    pub detection: MockDetectionCommand,
    pub suggestions: MockSuggestionQuery,
    pub service_health: MockServiceHealthQuery,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            accounts: MockAccountCommand::new(),
            inventory: MockInventoryCommand::new(),
            inventory_query: MockInventoryQuery::new(),
            marketplace: MockMarketplaceCommand::new(),
            marketplace_query: MockMarketplaceQuery::new(),
            detection: MockDetectionCommand::new(),
            suggestions: MockSuggestionQuery::new(),
            service_health: MockServiceHealthQuery::new(),
        }
    }
}

impl MockPorts {
    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            inventory: Arc::new(self.inventory),
            inventory_query: Arc::new(self.inventory_query),
            marketplace: Arc::new(self.marketplace),
            marketplace_query: Arc::new(self.marketplace_query),
            detection: Arc::new(self.detection),
            suggestions: Arc::new(self.suggestions),
            service_health: Arc::new(self.service_health),
            clock: Arc::new(DefaultClock),
        })
    }
}

async fn sign_in_handler(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Register a route that signs in as any user id, bypassing passwords.
pub fn configure_sign_in(cfg: &mut web::ServiceConfig) {
    cfg.route(
        &format!("{SIGN_IN_PATH}/{{id}}"),
        web::get().to(sign_in_handler),
    );
}

/// Sign in as `user` through [`configure_sign_in`] and return the cookie.
pub async fn sign_in<S, B>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("{SIGN_IN_PATH}/{user}"))
            .to_request(),
    )
    .await;
    session_cookie(&res).expect("sign-in sets a session cookie")
}

fn fixture_time() -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc
        .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp")
}

/// Inventory item owned by `owner` with the given status.
pub fn sample_item(owner: UserId, status: InventoryStatus) -> InventoryItem {
    InventoryItem::new(InventoryItemDraft {
        id: InventoryItemId::random(),
        owner,
        name: "Oak chair".to_owned(),
        category: "furniture".to_owned(),
        description: None,
        image_path: Some("/uploads/1700000000000-room.jpg".to_owned()),
        confidence: None,
        bbox: None,
        detection_method: DetectionMethod::Manual,
        status,
        created_at: fixture_time(),
        updated_at: fixture_time(),
    })
    .expect("valid fixture item")
}

/// Available listing sold by `seller`.
pub fn sample_listing(seller: UserId, item: Option<InventoryItemId>) -> MarketplaceListing {
    MarketplaceListing::new(ListingDraft {
        id: ListingId::random(),
        seller,
        name: "Oak chair".to_owned(),
        price: Price::new(45.0).expect("valid price"),
        category: "furniture".to_owned(),
        location: "Leeds".to_owned(),
        image: "/uploads/1700000000000-room.jpg".to_owned(),
        status: ListingStatus::Available,
        listed_at: fixture_time(),
        inventory_item_id: item,
    })
    .expect("valid fixture listing")
}
