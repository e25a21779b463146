//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document for the DeepTrace API.

use deeptrace_core::{
    AnalysisJob, AnalysisResult, DigestVerification, FrameScore, JobStatus, VerificationRecord,
};
use utoipa::OpenApi;

use crate::handlers::{
    DiagnosticsResponse, HealthResponse, ReadyResponse, RootResponse, StatsResponse,
    VerifyRequest,
};

/// DeepTrace API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DeepTrace API",
        version = "0.1.0",
        description = r#"
## Deepfake Analysis API

DeepTrace scores uploaded videos for manipulation and attaches a ledger proof
to every result.

- **Deterministic scoring** - identical bytes always yield identical frame scores
- **Ledger verification** - each SHA-256 maps to a reproducible transaction hash
- **Best-effort persistence** - results are stored when a record store is reachable

### How It Works

1. **Analyze** an MP4 or AVI via `POST /api/analyze`
2. Keep the returned `filehash`
3. **Verify** it later via `POST /api/verify` without re-uploading the file
4. Browse the latest stored analyses via `GET /api/stats`
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    tags(
        (name = "Analysis", description = "Score uploaded videos for deepfake likelihood"),
        (name = "Verification", description = "Look up file digests on the ledger"),
        (name = "Stats", description = "Dashboard statistics and recent analyses"),
        (name = "Health", description = "Service banner, diagnostics, health and readiness")
    ),
    paths(
        crate::handlers::health::root,
        crate::handlers::health::diagnostics,
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::analyze::analyze_handler,
        crate::handlers::verify::verify_handler,
        crate::handlers::stats::stats_handler,
    ),
    components(
        schemas(
            RootResponse,
            DiagnosticsResponse,
            HealthResponse,
            ReadyResponse,
            AnalysisResult,
            FrameScore,
            VerificationRecord,
            VerifyRequest,
            DigestVerification,
            StatsResponse,
            AnalysisJob,
            JobStatus,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_api_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/test", "/health", "/ready", "/api/analyze", "/api/verify", "/api/stats"]
        {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
