//! Analysis composition.
//!
//! Ties hashing, scoring, aggregation, and the ledger simulation into one
//! immutable result. Persistence is not handled here; callers attach the job
//! identifier once the store has answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::{DeeptraceError, Result};
use crate::ledger::VerificationRecord;
use crate::scoring::{aggregate_likelihood, generate_frame_scores, FrameScore};

/// Benchmark accuracy reported alongside every analysis.
pub const ACCURACY_BENCHMARK: f64 = 0.95;

/// Identifier of the (simulated) detection model.
pub const MODEL_ID: &str = "CNN+LSTM v1";

/// Job identifier returned when the result could not be persisted.
pub const TEMPORARY_JOB_ID: &str = "temporary";

/// Upload extensions accepted for analysis, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".mp4", ".avi"];

/// Reject filenames that do not end in a supported extension.
pub fn validate_filename(filename: &str) -> Result<()> {
    let lowered = filename.to_lowercase();
    if SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
    {
        Ok(())
    } else {
        Err(DeeptraceError::UnsupportedFileType(filename.to_string()))
    }
}

/// Processing state of a stored job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    #[default]
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

/// Everything computed for one upload, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAnalysis {
    pub filename: String,
    pub filesize: u64,
    pub filehash: ContentDigest,
    pub accuracy: f64,
    pub deepfake_likelihood: f64,
    pub frame_scores: Vec<FrameScore>,
    pub analyzed_at: DateTime<Utc>,
    pub verification: VerificationRecord,
}

impl MediaAnalysis {
    /// Run the pipeline over an upload.
    ///
    /// The filename is checked first; an unsupported extension returns before
    /// the content is hashed.
    pub fn run(
        filename: &str,
        content: &[u8],
        frame_count: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        validate_filename(filename)?;

        let filehash = ContentDigest::from_bytes(content);
        let frame_scores = generate_frame_scores(&filehash, frame_count);
        let deepfake_likelihood = aggregate_likelihood(&frame_scores);
        let verification = VerificationRecord::simulate(&filehash, now);

        tracing::debug!(
            filename = %filename,
            filehash = %filehash,
            frames = frame_scores.len(),
            likelihood = deepfake_likelihood,
            "Analysis computed"
        );

        Ok(Self {
            filename: filename.to_string(),
            filesize: content.len() as u64,
            filehash,
            accuracy: ACCURACY_BENCHMARK,
            deepfake_likelihood,
            frame_scores,
            analyzed_at: now,
            verification,
        })
    }

    /// The document written to the record store.
    pub fn to_job(&self) -> AnalysisJob {
        AnalysisJob {
            filename: self.filename.clone(),
            filesize: self.filesize,
            filehash: self.filehash.as_str().to_string(),
            status: JobStatus::Completed,
            accuracy: self.accuracy,
            deepfake_likelihood: self.deepfake_likelihood,
            model: MODEL_ID.to_string(),
            frame_scores: self.frame_scores.clone(),
            analyzed_at: Some(self.analyzed_at),
            verification: Some(self.verification.clone()),
        }
    }

    /// Attach the job identifier, producing the response body.
    pub fn into_result(self, job_id: impl Into<String>) -> AnalysisResult {
        AnalysisResult {
            job_id: job_id.into(),
            filename: self.filename,
            filesize: self.filesize,
            filehash: self.filehash.into_string(),
            accuracy: self.accuracy,
            deepfake_likelihood: self.deepfake_likelihood,
            frame_scores: self.frame_scores,
            analyzed_at: self.analyzed_at,
            verification: self.verification,
        }
    }
}

/// Analysis returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisResult {
    /// Store-assigned identifier, or `temporary` when persistence failed
    #[cfg_attr(feature = "openapi", schema(example = "550e8400-e29b-41d4-a716-446655440000"))]
    pub job_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "clip.mp4"))]
    pub filename: String,
    /// Upload size in bytes
    pub filesize: u64,
    /// SHA-256 of the upload, hex-encoded
    pub filehash: String,
    #[cfg_attr(feature = "openapi", schema(example = 0.95))]
    pub accuracy: f64,
    pub deepfake_likelihood: f64,
    pub frame_scores: Vec<FrameScore>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2026-01-08T10:00:00Z"))]
    pub analyzed_at: DateTime<Utc>,
    pub verification: VerificationRecord,
}

impl AnalysisResult {
    pub fn is_persisted(&self) -> bool {
        self.job_id != TEMPORARY_JOB_ID
    }
}

/// Stored analysis document (collection `analysisjob`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisJob {
    pub filename: String,
    pub filesize: u64,
    pub filehash: String,
    #[serde(default)]
    pub status: JobStatus,
    pub accuracy: f64,
    pub deepfake_likelihood: f64,
    #[cfg_attr(feature = "openapi", schema(example = "CNN+LSTM v1"))]
    pub model: String,
    #[serde(default)]
    pub frame_scores: Vec<FrameScore>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_filename_accepts_supported() {
        assert!(validate_filename("clip.mp4").is_ok());
        assert!(validate_filename("CLIP.MP4").is_ok());
        assert!(validate_filename("holiday.Avi").is_ok());
        assert!(validate_filename("archive.tar.mp4").is_ok());
    }

    #[test]
    fn test_validate_filename_rejects_others() {
        for name in ["clip.mov", "clip.mp4.txt", "mp4", "", "clip.mkv"] {
            assert_eq!(
                validate_filename(name),
                Err(DeeptraceError::UnsupportedFileType(name.to_string()))
            );
        }
    }

    #[test]
    fn test_run_composes_pipeline() {
        let analysis = MediaAnalysis::run("clip.mp4", b"abc", 60, now()).unwrap();

        assert_eq!(analysis.filesize, 3);
        assert_eq!(
            analysis.filehash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(analysis.accuracy, ACCURACY_BENCHMARK);
        assert_eq!(analysis.frame_scores.len(), 60);
        assert_eq!(analysis.deepfake_likelihood, 0.7412500000000001);
        assert_eq!(analysis.analyzed_at, now());
        assert_eq!(analysis.verification.timestamp, now());
        assert!(!analysis.verification.verified);
    }

    #[test]
    fn test_run_rejects_before_hashing() {
        let err = MediaAnalysis::run("clip.mov", b"abc", 60, now()).unwrap_err();
        assert!(matches!(err, DeeptraceError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_run_with_empty_content() {
        let analysis = MediaAnalysis::run("empty.avi", b"", 60, now()).unwrap();
        assert_eq!(analysis.filesize, 0);
        assert_eq!(analysis.filehash.as_str().len(), 64);
    }

    #[test]
    fn test_to_job_and_into_result_agree() {
        let analysis = MediaAnalysis::run("clip.mp4", b"payload", 10, now()).unwrap();
        let job = analysis.to_job();
        let result = analysis.into_result(TEMPORARY_JOB_ID);

        assert_eq!(job.filehash, result.filehash);
        assert_eq!(job.deepfake_likelihood, result.deepfake_likelihood);
        assert_eq!(job.frame_scores, result.frame_scores);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.model, MODEL_ID);
        assert!(!result.is_persisted());
    }

    #[test]
    fn test_result_json_shape() {
        let result = MediaAnalysis::run("clip.mp4", b"abc", 2, now())
            .unwrap()
            .into_result("job-1");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["job_id"], "job-1");
        assert_eq!(json["filename"], "clip.mp4");
        assert_eq!(json["accuracy"], 0.95);
        assert_eq!(json["frame_scores"][1]["frame_index"], 1);
        assert_eq!(json["analyzed_at"], "2026-03-01T12:00:00Z");
        assert_eq!(json["verification"]["network"], "ethereum");
        assert!(json["verification"].get("filehash").is_none());
    }

    #[test]
    fn test_job_status_round_trip_through_str() {
        for status in [
            JobStatus::Queued,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("done".parse::<JobStatus>().is_err());
    }
}
