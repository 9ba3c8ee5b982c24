//! Correlation id shared by logs, error envelopes and detector calls.
//!
//! The id lives in a Tokio task-local for the duration of one request, so
//! [`crate::domain::Error`] and the detector adapter read it without it being
//! threaded through every signature. Task-locals are not inherited by
//! `tokio::spawn`; wrap spawned work in [`TraceId::scope`] to keep the id.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Request correlation id, a UUID rendered in hyphenated form.
///
/// # Examples
/// ```
/// use redecor_backend::TraceId;
///
/// async fn scan_room() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "scanning room");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id supplied by a caller in a `trace-id` header.
    ///
    /// Only well-formed, non-nil UUIDs are adopted so clients cannot inject
    /// arbitrary text into logs.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::TraceId;
    ///
    /// assert!(TraceId::from_header("7b1c3c1e-8f64-4a4b-9a8e-0c3c4d5e6f70").is_some());
    /// assert!(TraceId::from_header("00000000-0000-0000-0000-000000000000").is_none());
    /// assert!(TraceId::from_header("drop table users").is_none());
    /// ```
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim())
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// Id of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    ///
    /// # Examples
    /// ```
    /// use redecor_backend::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let id = TraceId::generate();
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
