//! Server shared state
//!
//! Holds configuration and the document store for the HTTP server.

use crate::config::{Config, EngineConfig};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Submission store shared by all handlers
    pub store: Arc<DocumentStore>,

    started: Instant,
}

impl AppState {
    /// Create new application state around an opened store
    pub fn new(config: Config, store: DocumentStore) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store: Arc::new(store),
            started: Instant::now(),
        }
    }

    /// Snapshot of the engine tunables
    pub async fn engine(&self) -> EngineConfig {
        self.config.read().await.engine.clone()
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
