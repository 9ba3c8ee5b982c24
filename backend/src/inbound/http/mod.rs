//! HTTP inbound adapter exposing REST endpoints.

pub mod detection;
pub mod dto;
pub mod error;
pub mod health;
pub mod inventory;
pub mod marketplace;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod suggestions;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
pub use routes::configure_api;
