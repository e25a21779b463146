//! Dashboard statistics handler

use axum::{extract::State, Json};
use chrono::Utc;
use deeptrace_core::{AnalysisJob, ACCURACY_BENCHMARK};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Number of stored analyses returned by /api/stats.
pub const RECENT_LIMIT: usize = 10;

/// Response for GET /api/stats
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = 0.95)]
    pub accuracy_benchmark: f64,
    /// Changes every second, 0-99
    #[schema(example = 42)]
    pub realtime_threats: u64,
    /// Number of entries in `recent`
    pub analyses: usize,
    /// Latest stored analyses, newest first
    pub recent: Vec<AnalysisJob>,
}

/// Dashboard statistics
///
/// Never fails: an absent or unreachable store yields an empty `recent` list.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Current statistics", body = StatsResponse)
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let recent = state.analyzer.recent(RECENT_LIMIT).await;
    let realtime_threats = u64::try_from(Utc::now().timestamp()).unwrap_or(0) % 100;

    Json(StatsResponse {
        accuracy_benchmark: ACCURACY_BENCHMARK,
        realtime_threats,
        analyses: recent.len(),
        recent,
    })
}
