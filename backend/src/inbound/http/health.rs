//! Health endpoints.
//!
//! `/health/ready` and `/health/live` are orchestration probes backed by
//! [`HealthState`]. `/health` is a plain liveness ping and `/api/health`
//! reports whether the detection service answers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Readiness and liveness flags shared with the server lifecycle.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Start as live but not yet ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready once the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness checks, e.g. while draining before shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe: 200 once the server accepts traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingBody {
    #[schema(example = "ok")]
    pub status: String,
}

/// Minimal ping that never touches dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Process is up", body = PingBody))
)]
#[get("/health")]
pub async fn ping() -> web::Json<PingBody> {
    web::Json(PingBody {
        status: "ok".to_owned(),
    })
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthBody {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "connected")]
    pub backend: String,
    #[schema(example = "disconnected")]
    pub ml_service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_service_details: Option<Value>,
    #[schema(example = "2026-01-01T12:00:00.000Z")]
    pub timestamp: String,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Report backend and detection service connectivity.
///
/// Always answers 200; a detector that cannot be probed is reported as
/// `disconnected`.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Dependency status", body = ServiceHealthBody))
)]
#[get("/health")]
pub async fn service_health(state: web::Data<HttpState>) -> web::Json<ServiceHealthBody> {
    let detector = state.service_health.detector_status().await;
    web::Json(ServiceHealthBody {
        status: "healthy".to_owned(),
        backend: "connected".to_owned(),
        ml_service: if detector.connected {
            "connected"
        } else {
            "disconnected"
        }
        .to_owned(),
        ml_service_details: detector.details,
        timestamp: format_timestamp(state.clock.utc()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::ports::DetectorStatus;
    use crate::inbound::http::test_utils::MockPorts;

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_follows_state(#[case] is_ready: bool, #[case] expected: StatusCode) {
        let health = web::Data::new(HealthState::new());
        if is_ready {
            health.mark_ready();
        }
        let app = test::init_service(App::new().app_data(health).service(ready)).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), expected);
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[actix_web::test]
    async fn liveness_fails_once_draining() {
        let health = web::Data::new(HealthState::new());
        health.mark_unhealthy();
        let app = test::init_service(App::new().app_data(health).service(live)).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn ping_reports_ok() {
        let app = test::init_service(App::new().service(ping)).await;
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
                .await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[rstest]
    #[case(DetectorStatus { connected: true, details: Some(json!({ "status": "healthy" })) }, "connected")]
    #[case(DetectorStatus { connected: false, details: None }, "disconnected")]
    #[actix_web::test]
    async fn service_health_reports_detector_status(
        #[case] status: DetectorStatus,
        #[case] expected: &str,
    ) {
        let mut ports = MockPorts::default();
        let returned = status.clone();
        ports
            .service_health
            .expect_detector_status()
            .times(1)
            .return_once(move || returned);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(web::scope("/api").service(service_health)),
        )
        .await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "connected");
        assert_eq!(body["mlService"], expected);
        assert_eq!(body.get("mlServiceDetails").cloned(), status.details);
        assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    }
}
