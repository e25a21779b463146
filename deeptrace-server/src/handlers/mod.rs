//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod analyze;
pub mod health;
pub mod stats;
pub mod verify;

pub use crate::state::AppState;
pub use analyze::analyze_handler;
pub use health::{
    diagnostics, health, ready, root, DiagnosticsResponse, HealthResponse, ReadyResponse,
    RootResponse,
};
pub use stats::{stats_handler, StatsResponse, RECENT_LIMIT};
pub use verify::{verify_handler, VerifyRequest};
