//! Shared server state.

use sala_core::{BookingService, Config};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The conflict arbiter over the configured ledger backend.
    pub booking: BookingService,
    /// Which backend the ledger runs on, for the health endpoint.
    pub backend: &'static str,
}

impl AppState {
    /// Build the state from configuration: backend selection happens here,
    /// once, at startup.
    pub fn from_config(config: &Config) -> Self {
        let backend = if config.remote.is_some() { "remote" } else { "local" };
        Self {
            booking: BookingService::from_config(config),
            backend,
        }
    }
}
