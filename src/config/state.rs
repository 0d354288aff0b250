// Application state module
// Owns the configuration and the request router with its injected store

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::handler::Router;
use crate::store::ProductStore;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub router: Router,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Build the state around an explicitly owned product store
    pub fn new(config: &Config, store: Arc<ProductStore>) -> Self {
        Self {
            config: config.clone(),
            router: Router::new(store, config),
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }
}
