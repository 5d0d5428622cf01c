//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::ConnectionRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of live connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Capacity of each new connection's outbound queue.
    pub outbound_queue_capacity: usize,
}

impl AppState {
    /// Builds state with a fresh registry configured from `config`.
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::with_settings(
                config.registry_settings(),
            )),
            outbound_queue_capacity: config.outbound_queue_capacity,
        }
    }
}
