//! DeepTrace Server Library - REST API components for deepfake analysis
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use analyzer::{Analyzer, PersistOutcome};
pub use config::Config;
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_config, create_router_with_state};
pub use state::AppState;
pub use store::{
    AnalysisStore, MemoryAnalysisStore, PersistedJob, PostgresAnalysisStore, SharedStore,
    StoreError,
};
