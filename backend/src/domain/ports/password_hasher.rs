//! Port abstraction for password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed or a stored hash could not be parsed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Produces and checks encoded password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into an encoded string suitable for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against an encoded hash.
    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHashError>;
}
