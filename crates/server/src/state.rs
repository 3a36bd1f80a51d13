use std::sync::Arc;

use doorman_core::{AuditStore, Config, TicketRegistry, TicketScanner};

use crate::api::ws::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    registry: Arc<dyn TicketRegistry>,
    scanner: Arc<TicketScanner>,
    audit_store: Arc<dyn AuditStore>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<dyn TicketRegistry>,
        scanner: Arc<TicketScanner>,
        audit_store: Arc<dyn AuditStore>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            registry,
            scanner,
            audit_store,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &dyn TicketRegistry {
        self.registry.as_ref()
    }

    pub fn scanner(&self) -> &TicketScanner {
        self.scanner.as_ref()
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
