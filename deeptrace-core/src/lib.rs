//! DeepTrace Core - deterministic media analysis pipeline
//!
//! This crate computes the per-frame scores, the aggregate deepfake likelihood,
//! and the simulated ledger verification for an uploaded media file. It does
//! not decode media or run inference: every value is derived from the SHA-256
//! of the file, so the same bytes always give the same analysis.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use deeptrace_core::{MediaAnalysis, DEFAULT_FRAME_COUNT, TEMPORARY_JOB_ID};
//!
//! let analysis = MediaAnalysis::run("clip.mp4", b"raw bytes", DEFAULT_FRAME_COUNT, Utc::now())?;
//! assert_eq!(analysis.frame_scores.len(), DEFAULT_FRAME_COUNT);
//!
//! let result = analysis.into_result(TEMPORARY_JOB_ID);
//! assert!(!result.is_persisted());
//! # Ok::<(), deeptrace_core::DeeptraceError>(())
//! ```

pub mod activity;
pub mod analysis;
pub mod digest;
pub mod error;
pub mod ledger;
pub mod scoring;

pub use activity::{ActivityAction, ActivityMetadata, MetadataValue, UserActivity};
pub use analysis::{
    validate_filename, AnalysisJob, AnalysisResult, JobStatus, MediaAnalysis, ACCURACY_BENCHMARK,
    MODEL_ID, SUPPORTED_EXTENSIONS, TEMPORARY_JOB_ID,
};
pub use digest::ContentDigest;
pub use error::{DeeptraceError, Result};
pub use ledger::{verify_digest, DigestVerification, VerificationRecord, CONTRACT_ADDRESS, NETWORK};
pub use scoring::{
    aggregate_likelihood, generate_frame_scores, FrameScore, ScoreGenerator, DEFAULT_FRAME_COUNT,
};
