//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde::Deserialize;
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("already sold"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("detector down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

async fn envelope_of(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error envelope deserialises");
    (status, header, body)
}

#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace_id() {
    let error = Error::internal("connection string postgres://secret")
        .with_trace_id(TRACE_ID)
        .with_details(serde_json::json!({ "secret": "x" }));

    let (status, header, body) = envelope_of(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    insta::assert_json_snapshot!(body, @r#"
    {
      "code": "internal_error",
      "message": "Internal server error",
      "traceId": "00000000-0000-0000-0000-000000000000"
    }
    "#);
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("missing required field: name")
        .with_trace_id(TRACE_ID)
        .with_details(serde_json::json!({ "field": "name", "code": "missing_field" }));

    let (status, header, body) = envelope_of(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    insta::assert_json_snapshot!(body, @r#"
    {
      "code": "invalid_request",
      "message": "missing required field: name",
      "traceId": "00000000-0000-0000-0000-000000000000",
      "details": {
        "code": "missing_field",
        "field": "name"
      }
    }
    "#);
}

#[actix_web::test]
async fn errors_without_trace_id_omit_the_header() {
    let (_, header, body) = envelope_of(&Error::not_found("listing not found")).await;
    assert!(header.is_none());
    assert!(body.trace_id().is_none());
}

#[derive(Deserialize)]
struct Payload {
    #[expect(dead_code, reason = "only the extractor outcome matters")]
    name: String,
}

#[derive(Deserialize)]
struct Filters {
    #[expect(dead_code, reason = "only the extractor outcome matters")]
    limit: u32,
}

#[actix_web::test]
async fn malformed_json_becomes_invalid_request() {
    let app = actix_test::init_service(App::new().app_data(json_config()).route(
        "/",
        web::post().to(|_: web::Json<Payload>| async { HttpResponse::Ok().finish() }),
    ))
    .await;

    let req = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["source"], "body");
}

#[actix_web::test]
async fn malformed_query_becomes_invalid_request() {
    let app = actix_test::init_service(App::new().app_data(query_config()).route(
        "/",
        web::get().to(|_: web::Query<Filters>| async { HttpResponse::Ok().finish() }),
    ))
    .await;

    let req = actix_test::TestRequest::get().uri("/?limit=lots").to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["source"], "query");
}
