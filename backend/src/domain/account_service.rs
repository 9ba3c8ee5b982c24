//! Account registration and sign-in.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, Error, LoginCredentials, Registration, User, UserId};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> AccountService<R, H> {
    /// Create a service over the user repository and password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<R, H> AccountService<R, H>
where
    R: UserRepository,
{
    async fn find_by_identifier(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<User>, UserPersistenceError> {
        if credentials.is_email()
            && let Ok(email) = EmailAddress::new(credentials.identifier())
            && let Some(user) = self.users.find_by_email(&email).await?
        {
            return Ok(Some(user));
        }
        self.users.find_by_username(credentials.identifier()).await
    }
}

#[async_trait]
impl<R, H> AccountCommand for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
            password_hash,
            self.clock.utc(),
        );
        self.users
            .insert(&user)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id(), "registered account");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let user = self
            .find_by_identifier(&credentials)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .map_err(map_hash_error)?;
        if !verified {
            warn!(user_id = %user.id(), "rejected login with wrong password");
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
