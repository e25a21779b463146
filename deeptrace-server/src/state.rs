//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::store::SharedStore;

/// Application state containing shared resources.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Analysis orchestrator, owns the optional record store
    pub analyzer: Arc<Analyzer>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// Build state from configuration and an already-connected store.
    pub fn new(config: &Config, store: Option<SharedStore>) -> Self {
        Self {
            analyzer: Arc::new(
                Analyzer::new(store, config.frame_count).with_store_timeout(config.store_timeout()),
            ),
            max_file_size: config.max_file_size(),
        }
    }

    /// The configured record store, if any.
    pub fn store(&self) -> Option<&SharedStore> {
        self.analyzer.store()
    }
}
