//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> TraceId {
    TRACE_ID.parse().expect("fixture trace id is a valid UUID")
}

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::unauthorized(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case::forbidden(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case::not_found(Error::not_found("gone"), ErrorCode::NotFound)]
#[case::conflict(Error::conflict("clash"), ErrorCode::Conflict)]
#[case::unavailable(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(trace_id: TraceId) {
    let error = TraceId::scope(trace_id, async { Error::conflict("clash") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_omits_empty_fields() {
    let error = Error::not_found("missing");
    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[rstest]
fn serialises_trace_id_and_details() {
    let error = Error::service_unavailable("detector down")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "reason": "connection refused" }));
    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "service_unavailable",
            "message": "detector down",
            "traceId": TRACE_ID,
            "details": { "reason": "connection refused" }
        })
    );
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::invalid_request("bad price").to_string(), "bad price");
}
