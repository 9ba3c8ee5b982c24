//! Room redecoration marketplace backend.
//!
//! Users upload room photos, an external detector turns them into inventory
//! items, and items can be listed on a public marketplace. The crate follows
//! a hexagonal layout: [`domain`] holds entities, ports and services,
//! [`inbound`] adapts HTTP requests onto the driving ports, and [`outbound`]
//! implements the driven ports against PostgreSQL, the filesystem and the
//! detection service.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
pub use settings::AppSettings;
