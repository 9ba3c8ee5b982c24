//! Driving port for post-scan furniture suggestions.

use async_trait::async_trait;

use crate::domain::{Error, Suggestion};

/// Suggestions for a previously uploaded room image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionQuery: Send + Sync {
    /// Suggestions for `filename`; unsafe names are invalid requests.
    ///
    /// Falls back to a static list when the detector catalogue is
    /// unavailable, so detector failures never surface here.
    async fn suggestions_for(&self, filename: &str) -> Result<Vec<Suggestion>, Error>;
}
