//! Media analysis handler
//!
//! Handles POST /api/analyze uploads.

use axum::{
    extract::{Multipart, State},
    Json,
};
use deeptrace_core::AnalysisResult;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;

/// Analyze an uploaded video
///
/// Accepts multipart/form-data with:
/// - **file** (required): MP4 or AVI video, sent with its filename
///
/// The response carries per-frame confidence scores, the aggregate deepfake
/// likelihood, and a simulated ledger proof for the file's SHA-256. When the
/// record store is unavailable the analysis is still returned, with
/// `job_id = "temporary"`.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "Analysis",
    request_body(
        content_type = "multipart/form-data",
        description = "Video file to analyze (field name: file)"
    ),
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResult),
        (status = 400, description = "Missing file, unsupported extension, or file too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let file = MultipartFields::parse(&mut multipart, state.max_file_size)
        .await?
        .into_file()?;
    let filename = file.require_name()?;

    tracing::debug!(
        filename = %filename,
        size = file.data.len(),
        content_type = ?file.content_type,
        "Analyze request"
    );

    let result = state.analyzer.analyze(filename, &file.data).await?;

    Ok(Json(result))
}
