//! Digest verification handler
//!
//! Handles POST /api/verify requests against the simulated ledger.

use axum::Json;
use chrono::Utc;
use deeptrace_core::{verify_digest, DigestVerification};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Request body for verification
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Hex-encoded SHA-256 of the file, any case
    #[schema(example = "6f715f06f5fff766ffcbee2d517a43b990969cb8df27560b7d4442c11d6af498")]
    pub filehash: String,
}

/// Verify a file digest
///
/// Looks the digest up on the simulated ledger. No file is needed: the same
/// digest always yields the same `tx_hash` and `verified` flag, and
/// `timestamp` is the time of the lookup.
#[utoipa::path(
    post,
    path = "/api/verify",
    tag = "Verification",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification record", body = DigestVerification),
        (status = 400, description = "filehash is not a hexadecimal string")
    )
)]
pub async fn verify_handler(
    Json(request): Json<VerifyRequest>,
) -> Result<Json<DigestVerification>, ApiError> {
    let verification = verify_digest(&request.filehash, Utc::now())?;

    tracing::debug!(
        filehash = %verification.filehash,
        verified = verification.record.verified,
        "Digest verified"
    );

    Ok(Json(verification))
}
