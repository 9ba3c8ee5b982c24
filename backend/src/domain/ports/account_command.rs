//! Driving port for account registration and sign-in.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User};

/// Use-cases behind `/api/register` and `/api/login`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. A taken email yields a conflict error.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Authenticate by username or email.
    ///
    /// Unknown identifiers yield `not_found`; a wrong password yields
    /// `unauthorized`.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;
}
