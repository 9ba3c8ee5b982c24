//! Tests for account handlers.

use super::*;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::Value;

use crate::domain::{EmailAddress, User, UserId, Username};
use crate::inbound::http::error::json_config;
use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_session_middleware};

#[fixture]
fn ada() -> User {
    User::new(
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        Username::new("ada").expect("username"),
        EmailAddress::new("ada@example.com").expect("email"),
        "$argon2id$stub".to_owned(),
        chrono::Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    )
}

macro_rules! users_app {
    ($ports:expr) => {
        test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new($ports.into_state()))
                .app_data(json_config())
                .service(
                    web::scope("/api")
                        .service(register)
                        .service(login)
                        .service(logout),
                ),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn register_returns_created_user_without_hash(ada: User) {
    let mut ports = MockPorts::default();
    let created = ada.clone();
    ports
        .accounts
        .expect_register()
        .withf(|registration| {
            registration.username().as_ref() == "ada"
                && registration.email().as_ref() == "ada@example.com"
        })
        .times(1)
        .return_once(move |_| Ok(created));
    let app = users_app!(ports);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(RegisterRequest {
                username: Some("ada".to_owned()),
                email: Some("Ada@Example.com".to_owned()),
                password: Some("correct horse".to_owned()),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully!");
    assert_eq!(body["user"]["username"], "ada");
    assert!(body["user"].get("passwordHash").is_none());
}

#[rstest]
#[case(RegisterRequest { username: None, email: Some("a@b.c".to_owned()), password: Some("longenough".to_owned()) }, "username", "missing_field")]
#[case(RegisterRequest { username: Some("ada".to_owned()), email: Some("nope".to_owned()), password: Some("longenough".to_owned()) }, "email", "invalid_value")]
#[case(RegisterRequest { username: Some("ada".to_owned()), email: Some("a@b.c".to_owned()), password: Some("short".to_owned()) }, "password", "invalid_value")]
#[actix_web::test]
async fn register_rejects_invalid_payloads(
    #[case] request: RegisterRequest,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = users_app!(MockPorts::default());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(request)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_register()
        .return_once(|_| Err(Error::conflict("email already registered")));
    let app = users_app!(ports);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(RegisterRequest {
                username: Some("ada".to_owned()),
                email: Some("ada@example.com".to_owned()),
                password: Some("correct horse".to_owned()),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn login_sets_session_cookie(ada: User) {
    let mut ports = MockPorts::default();
    let found = ada.clone();
    ports
        .accounts
        .expect_login()
        .withf(|credentials| credentials.identifier() == "ada@example.com")
        .times(1)
        .return_once(move |_| Ok(found));
    let app = users_app!(ports);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({ "username": "ada@example.com", "password": "pw" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_some());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Login successful!");
    assert_eq!(body["user"]["id"], ada.id().to_string());
}

#[rstest]
#[case(Error::not_found("user not found"), StatusCode::NOT_FOUND)]
#[case(Error::unauthorized("invalid credentials"), StatusCode::UNAUTHORIZED)]
#[actix_web::test]
async fn login_failures_keep_their_status(#[case] error: Error, #[case] expected: StatusCode) {
    let mut ports = MockPorts::default();
    ports.accounts.expect_login().return_once(move |_| Err(error));
    let app = users_app!(ports);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(LoginRequest {
                identifier: Some("ada".to_owned()),
                password: Some("pw".to_owned()),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
    assert!(session_cookie(&res).is_none());
}

#[rstest]
#[actix_web::test]
async fn login_requires_both_fields() {
    let app = users_app!(MockPorts::default());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(LoginRequest {
                identifier: Some("  ".to_owned()),
                password: Some("pw".to_owned()),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "empty_identifier");
}

#[rstest]
#[actix_web::test]
async fn logout_acknowledges() {
    let app = users_app!(MockPorts::default());

    let res =
        test::call_service(&app, test::TestRequest::post().uri("/api/logout").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: MessageBody = test::read_body_json(res).await;
    assert!(body.success);
}
