//! Health check handlers
//!
//! Provides the service banner, store diagnostics, and health/readiness
//! endpoints for monitoring and orchestration.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Maximum length of a store error echoed by /test.
const DIAGNOSTIC_ERROR_CHARS: usize = 80;

/// Service banner
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    #[schema(example = "DeepTrace Backend")]
    pub name: &'static str,
    #[schema(example = "ok")]
    pub status: &'static str,
}

/// GET / - Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "DeepTrace Backend",
        status: "ok",
    })
}

/// Store diagnostics
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    #[schema(example = "Running")]
    pub backend: &'static str,
    /// "Connected", "Not Configured", or the (truncated) store error
    #[schema(example = "Connected")]
    pub database: String,
    /// Collections held by the store, when it answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
}

/// GET /test - Store connectivity diagnostics
#[utoipa::path(
    get,
    path = "/test",
    tag = "Health",
    responses((status = 200, description = "Diagnostics", body = DiagnosticsResponse))
)]
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let (database, collections) = match state.analyzer.check_store().await {
        None => ("Not Configured".to_string(), None),
        Some(Ok(names)) => ("Connected".to_string(), Some(names)),
        Some(Err(e)) => (truncate_chars(&e.to_string(), DIAGNOSTIC_ERROR_CHARS), None),
    };

    Json(DiagnosticsResponse {
        backend: "Running",
        database,
        collections,
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: &'static str,
    /// Server version from Cargo.toml
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
    /// Record store backend, if one is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<&'static str>,
}

/// GET /health - Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "deeptrace-server",
        store: state.store().map(|s| s.backend()),
    })
}

/// Readiness response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
    /// Optional message explaining status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// GET /ready - Readiness probe
///
/// Returns 503 when a store is configured but does not answer. A server
/// without a store is ready; it just does not persist.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to accept traffic", body = ReadyResponse),
        (status = 503, description = "Record store unreachable")
    )
)]
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ApiError> {
    let Some(check) = state.analyzer.check_store().await else {
        return Ok(Json(ReadyResponse {
            ready: true,
            message: Some("running without persistence"),
        }));
    };

    check.map_err(|e| ApiError::service_unavailable(format!("Record store: {}", e)))?;

    Ok(Json(ReadyResponse {
        ready: true,
        message: None,
    }))
}
