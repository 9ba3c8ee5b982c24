//! Errors surfaced to client views.

use thiserror::Error;

/// Message shown when the server never answered.
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot reach the server. Check your connection and try again.";

/// Failure of a client operation.
///
/// Variants carry owned strings so state snapshots can be cloned freely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response arrived: connection refused, DNS failure, timeout.
    #[error("server unreachable: {message}")]
    Unreachable {
        /// Transport error text, for logs.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided `message` (or `error`) text, verbatim.
        message: String,
        /// Stable error code from the envelope, when present.
        code: Option<String>,
    },
    /// A success response did not have the expected shape.
    #[error("unexpected response: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },
    /// The request could not be built from the given input.
    #[error("invalid request: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },
    /// The operation is already running and does not queue.
    #[error("an operation is already in progress")]
    Busy,
}

impl ClientError {
    /// Text suitable for an alert or banner.
    ///
    /// # Examples
    /// ```
    /// use redecor_client::{ClientError, UNREACHABLE_MESSAGE};
    ///
    /// let err = ClientError::Unreachable { message: "connection refused".into() };
    /// assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
    ///
    /// let err = ClientError::Api { status: 400, message: "Missing name".into(), code: None };
    /// assert_eq!(err.user_message(), "Missing name");
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable { .. } => UNREACHABLE_MESSAGE.to_owned(),
            Self::Api { message, .. } => message.clone(),
            Self::Decode { .. } => "The server sent an unexpected response.".to_owned(),
            Self::InvalidInput { message } => message.clone(),
            Self::Busy => "Please wait for the current operation to finish.".to_owned(),
        }
    }

    /// HTTP status when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn unreachable(error: &reqwest::Error) -> Self {
        Self::Unreachable {
            message: error.to_string(),
        }
    }

    pub(crate) fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: error.to_string(),
        }
    }
}
