//! Account handlers.
//!
//! ```text
//! POST /api/register {"username":"ada","email":"ada@example.com","password":"correct horse"}
//! POST /api/login {"identifier":"ada","password":"correct horse"}
//! POST /api/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{MessageBody, UserBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, required_text};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const IDENTIFIER: FieldName = FieldName::new("identifier");

/// Sign-up request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign-in request body; `identifier` is a username or an email address.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// `{success, message, user}` returned by register and login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    pub user: UserBody,
}

fn map_registration_error(error: &RegistrationValidationError) -> Error {
    let field = match error {
        RegistrationValidationError::User(
            UserValidationError::EmptyUsername | UserValidationError::UsernameTooLong { .. },
        ) => USERNAME,
        RegistrationValidationError::User(UserValidationError::InvalidEmail) => EMAIL,
        RegistrationValidationError::User(_) => FieldName::new("user"),
        RegistrationValidationError::PasswordTooShort { .. } => PASSWORD,
    };
    invalid_value_error(field, error.to_string())
}

fn map_login_error(error: &LoginValidationError) -> Error {
    let (field, code) = match error {
        LoginValidationError::EmptyIdentifier => (IDENTIFIER, "empty_identifier"),
        LoginValidationError::EmptyPassword => (PASSWORD, "empty_password"),
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": field.as_str(), "code": code }))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let username = required_text(username, USERNAME)?;
    let email = required_text(email, EMAIL)?;
    let password = required_text(password, PASSWORD)?;
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(|err| map_registration_error(&err))?;

    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(AccountResponse {
        success: true,
        message: "User registered successfully!".to_owned(),
        user: UserBody::from(&user),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AccountResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Wrong password", body = ErrorSchema),
        (status = 404, description = "Unknown username or email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest {
        identifier,
        password,
    } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        identifier.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(|err| map_login_error(&err))?;

    let user = state.accounts.login(credentials).await?;
    session.persist_user(&user.id())?;
    info!(user_id = %user.id(), "user signed in");
    Ok(HttpResponse::Ok().json(AccountResponse {
        success: true,
        message: "Login successful!".to_owned(),
        user: UserBody::from(&user),
    }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Session cleared", body = MessageBody)),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().json(MessageBody::ok("Logged out"))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
