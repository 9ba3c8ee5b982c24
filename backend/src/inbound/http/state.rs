//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, DetectionCommand, InventoryCommand, InventoryQuery, MarketplaceCommand,
    MarketplaceQuery, ServiceHealthQuery, SuggestionQuery,
};

/// Parameter object bundling every port implementation used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub inventory: Arc<dyn InventoryCommand>,
    pub inventory_query: Arc<dyn InventoryQuery>,
    pub marketplace: Arc<dyn MarketplaceCommand>,
    pub marketplace_query: Arc<dyn MarketplaceQuery>,
    pub detection: Arc<dyn DetectionCommand>,
    pub suggestions: Arc<dyn SuggestionQuery>,
    pub service_health: Arc<dyn ServiceHealthQuery>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub inventory: Arc<dyn InventoryCommand>,
    pub inventory_query: Arc<dyn InventoryQuery>,
    pub marketplace: Arc<dyn MarketplaceCommand>,
    pub marketplace_query: Arc<dyn MarketplaceQuery>,
    pub detection: Arc<dyn DetectionCommand>,
    pub suggestions: Arc<dyn SuggestionQuery>,
    pub service_health: Arc<dyn ServiceHealthQuery>,
    pub clock: Arc<dyn Clock>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            inventory,
            inventory_query,
            marketplace,
            marketplace_query,
            detection,
            suggestions,
            service_health,
            clock,
        } = ports;
        Self {
            accounts,
            inventory,
            inventory_query,
            marketplace,
            marketplace_query,
            detection,
            suggestions,
            service_health,
            clock,
        }
    }
}
