//! End-to-end coverage of the room scan to marketplace sale journey.
//!
//! The app is assembled through the same state builders `main` uses, with the
//! in-memory store and a scripted detector standing in for the ML service.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{App, test as actix_test, web};
use redecor_backend::AppSettings;
use redecor_backend::domain::ports::ObjectDetectorError;
use redecor_backend::inbound::http::configure_api;
use redecor_backend::inbound::http::detection::UploadLimit;
use redecor_backend::inbound::http::error::{json_config, path_config, query_config};
use redecor_backend::test_support::{ScriptedDetector, detected_object_payload};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

// The builders carry a few helpers only `main` calls.
#[allow(dead_code)]
#[path = "../src/server/config.rs"]
mod server_config;
pub use server_config::ServerConfig;

#[allow(dead_code)]
#[path = "../src/server/state_builders.rs"]
mod state_builders;

use state_builders::{DetectorHandle, build_http_state_with_detector};

const BOUNDARY: &str = "flow-boundary";

fn settings(upload_dir: &Path) -> AppSettings {
    AppSettings {
        host: None,
        port: None,
        database_url: None,
        frontend_url: None,
        ml_service_url: None,
        upload_dir: Some(upload_dir.to_path_buf()),
        detect_timeout_secs: None,
        probe_timeout_secs: None,
        detect_max_attempts: Some(2),
        retry_initial_backoff_ms: Some(1),
        retry_max_backoff_ms: Some(5),
        max_upload_bytes: None,
        db_max_connections: None,
    }
}

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

struct Harness {
    detector: Arc<ScriptedDetector>,
    uploads: TempDir,
}

#[fixture]
fn uploads() -> TempDir {
    TempDir::new().expect("temp upload dir")
}

async fn start(
    harness: &Harness,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let config = ServerConfig::new(
        settings(harness.uploads.path()),
        Key::generate(),
        false,
        SameSite::Lax,
        SocketAddr::from(([127, 0, 0, 1], 0)),
    );
    let state = build_http_state_with_detector(
        &config,
        DetectorHandle {
            detector: harness.detector.clone(),
            location: "http://detector.test".to_owned(),
        },
    )
    .expect("state builds");

    actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(web::Data::new(UploadLimit::default()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(session_middleware())
            .wrap(redecor_backend::Trace)
            .configure(configure_api),
    )
    .await
}

fn photo(filename: &str) -> actix_test::TestRequest {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
         Content-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(b"\xff\xd8\xff\xe0 fake jpeg");
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    actix_test::TestRequest::post()
        .uri("/api/detect-objects")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn signed_in<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, _) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({
                "username": "maya",
                "email": "maya@example.com",
                "password": "correct horse"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "identifier": "maya@example.com", "password": "correct horse" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

#[rstest]
#[actix_web::test]
async fn scanned_items_can_be_listed_and_sold(uploads: TempDir) {
    let harness = Harness {
        detector: Arc::new(ScriptedDetector::new().then_objects(vec![
            detected_object_payload("Armchair", "chair", 0.91),
            detected_object_payload("Floor lamp", "lamp", 0.74),
        ])),
        uploads,
    };
    let app = start(&harness).await;
    let cookie = signed_in(&app).await;

    let (status, scan) = send(&app, photo("living room.jpg").cookie(cookie.clone()).to_request()).await;
    assert_eq!(status, StatusCode::OK, "{scan}");
    assert_eq!(scan["items_added"], json!(2));
    let image_url = scan["image_url"].as_str().expect("image url");
    let stored_name = image_url.strip_prefix("/uploads/").expect("uploads prefix");
    assert!(harness.uploads.path().join(stored_name).is_file());

    let (status, inventory) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/inventory")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inventory["total"], json!(2));
    let chair = inventory["inventory"]
        .as_array()
        .expect("items")
        .iter()
        .find(|item| item["name"] == json!("Armchair"))
        .expect("armchair detected")
        .clone();
    assert_eq!(chair["detectionMethod"], json!("ai_scan"));
    assert_eq!(chair["imagePath"], json!(image_url));

    let (status, created) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/marketplace")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Armchair",
                "price": "45",
                "category": "chair",
                "location": "Leeds",
                "image": image_url,
                "inventoryId": chair["id"],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["inventory_item"]["status"], json!("listed"));
    let listing_id = created["marketplace_item"]["id"]
        .as_str()
        .expect("listing id")
        .to_owned();

    let (status, market) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/marketplace?category=chair")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(market["total"], json!(1));
    assert_eq!(market["items"][0]["price"], json!(45.0));

    let (status, sold) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/marketplace/{listing_id}/sold"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sold["marketplace_item"]["status"], json!("sold"));
    assert_eq!(sold["inventory_item"]["status"], json!("sold"));

    let (_, remaining) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/marketplace")
            .to_request(),
    )
    .await;
    assert_eq!(remaining["total"], json!(0));
}

#[rstest]
#[actix_web::test]
async fn busy_detector_is_retried_once(uploads: TempDir) {
    let harness = Harness {
        detector: Arc::new(
            ScriptedDetector::new()
                .then(Err(ObjectDetectorError::upstream(503_u16, "warming up")))
                .then_objects(vec![detected_object_payload("Desk", "table", 0.8)]),
        ),
        uploads,
    };
    let app = start(&harness).await;
    let cookie = signed_in(&app).await;

    let (status, scan) = send(&app, photo("office.png").cookie(cookie).to_request()).await;

    assert_eq!(status, StatusCode::OK, "{scan}");
    assert_eq!(scan["items_added"], json!(1));
    assert_eq!(harness.detector.detect_calls(), 2);
}

#[rstest]
#[actix_web::test]
async fn unreachable_detector_fails_fast(uploads: TempDir) {
    let harness = Harness {
        detector: Arc::new(ScriptedDetector::new()),
        uploads,
    };
    let app = start(&harness).await;
    let cookie = signed_in(&app).await;

    let (status, body) = send(&app, photo("hall.jpg").cookie(cookie.clone()).to_request()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], json!("service_unavailable"));
    assert!(
        body["details"]["reason"]
            .as_str()
            .is_some_and(|reason| reason.contains("http://detector.test")),
        "{body}"
    );
    assert_eq!(harness.detector.detect_calls(), 1);

    let (_, inventory) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/inventory")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(inventory["total"], json!(0));
}
