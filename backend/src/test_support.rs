//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and, through the `test-support` feature, by
//! the integration tests in `tests/`.

mod clock;
mod detector;
mod retry;

pub use clock::MutableClock;
pub use detector::{ScriptedDetector, detected_object_payload};
pub use retry::{ImmediateSleeper, NoJitter, RecordingSleeper};
