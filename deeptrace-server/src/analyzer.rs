//! Analysis orchestration
//!
//! Runs the scoring pipeline for one upload and makes a single, best-effort
//! attempt to persist the result. A store that is missing or does not answer
//! in time never fails the request: the result is returned with the
//! `temporary` job id instead.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deeptrace_core::{AnalysisJob, AnalysisResult, MediaAnalysis, TEMPORARY_JOB_ID};

use crate::store::{SharedStore, StoreError};

/// Outcome of the persistence attempt for one analysis.
#[derive(Debug)]
pub enum PersistOutcome {
    /// The store accepted the record and assigned an identifier.
    Persisted { job_id: String },
    /// No store is configured.
    NotConfigured,
    /// The store rejected the write or could not be reached.
    Failed(StoreError),
}

impl PersistOutcome {
    /// Job identifier to report to the caller.
    pub fn job_id(&self) -> &str {
        match self {
            Self::Persisted { job_id } => job_id,
            Self::NotConfigured | Self::Failed(_) => TEMPORARY_JOB_ID,
        }
    }
}

/// Longest a single store call may take before it counts as failed.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinates hashing, scoring, verification, and persistence.
pub struct Analyzer {
    store: Option<SharedStore>,
    frame_count: usize,
    store_timeout: Duration,
}

impl Analyzer {
    pub fn new(store: Option<SharedStore>, frame_count: usize) -> Self {
        Self {
            store,
            frame_count,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bound every store call by `timeout`.
    ///
    /// Keep it below the request timeout so a stalled store still leaves
    /// time to answer with the computed result.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn store(&self) -> Option<&SharedStore> {
        self.store.as_ref()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Analyze an upload as of now.
    pub async fn analyze(
        &self,
        filename: &str,
        content: &[u8],
    ) -> deeptrace_core::Result<AnalysisResult> {
        self.analyze_at(filename, content, Utc::now()).await
    }

    /// Analyze an upload with an explicit analysis time.
    ///
    /// Fails only for an unsupported filename, before anything is hashed or
    /// written.
    pub async fn analyze_at(
        &self,
        filename: &str,
        content: &[u8],
        now: DateTime<Utc>,
    ) -> deeptrace_core::Result<AnalysisResult> {
        let analysis = MediaAnalysis::run(filename, content, self.frame_count, now)?;

        let outcome = self.persist(&analysis.to_job()).await;
        match &outcome {
            PersistOutcome::Persisted { job_id } => {
                tracing::info!(
                    job_id = %job_id,
                    filehash = %analysis.filehash,
                    likelihood = analysis.deepfake_likelihood,
                    "Analysis persisted"
                );
            }
            PersistOutcome::NotConfigured => {
                tracing::debug!(
                    filehash = %analysis.filehash,
                    "No record store configured, returning temporary job id"
                );
            }
            PersistOutcome::Failed(e) => {
                tracing::warn!(
                    filehash = %analysis.filehash,
                    error = %e,
                    "Failed to persist analysis, returning temporary job id"
                );
            }
        }

        Ok(analysis.into_result(outcome.job_id()))
    }

    /// Single write attempt. No retries.
    async fn persist(&self, job: &AnalysisJob) -> PersistOutcome {
        let Some(store) = &self.store else {
            return PersistOutcome::NotConfigured;
        };

        match self.bounded(store.create(job)).await {
            Ok(job_id) => PersistOutcome::Persisted { job_id },
            Err(e) => PersistOutcome::Failed(e),
        }
    }

    /// Most recent stored jobs, newest first.
    ///
    /// An absent or failing store yields an empty list.
    pub async fn recent(&self, limit: usize) -> Vec<AnalysisJob> {
        let Some(store) = &self.store else {
            return Vec::new();
        };

        match self.bounded(store.list_recent(limit)).await {
            Ok(jobs) => jobs.into_iter().map(|p| p.job).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list recent analyses");
                Vec::new()
            }
        }
    }

    /// Ask the store which collections it holds.
    ///
    /// `None` when no store is configured.
    pub async fn check_store(&self) -> Option<Result<Vec<String>, StoreError>> {
        let store = self.store.as_ref()?;
        Some(self.bounded(store.collections()).await)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "no answer within {} ms",
                self.store_timeout.as_millis()
            ))),
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("store", &self.store.as_ref().map(|s| s.backend()))
            .field("frame_count", &self.frame_count)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::store::{AnalysisStore, MemoryAnalysisStore, PersistedJob};
    use async_trait::async_trait;
    use deeptrace_core::{DeeptraceError, DEFAULT_FRAME_COUNT};

    /// Logs every call it receives and can stall before answering.
    #[derive(Default)]
    struct CallLog {
        inner: MemoryAnalysisStore,
        calls: Mutex<Vec<&'static str>>,
        stall: Option<Duration>,
    }

    impl CallLog {
        fn stalling(stall: Duration) -> Self {
            Self {
                stall: Some(stall),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        async fn enter(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }
        }
    }

    #[async_trait]
    impl AnalysisStore for CallLog {
        fn backend(&self) -> &'static str {
            "call-log"
        }

        async fn create(&self, job: &AnalysisJob) -> Result<String, StoreError> {
            self.enter("create").await;
            self.inner.create(job).await
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<PersistedJob>, StoreError> {
            self.enter("list_recent").await;
            self.inner.list_recent(limit).await
        }

        async fn collections(&self) -> Result<Vec<String>, StoreError> {
            self.enter("collections").await;
            self.inner.collections().await
        }
    }

    fn analyzer_with<S: AnalysisStore + 'static>(store: &Arc<S>) -> Analyzer {
        let shared: SharedStore = store.clone();
        Analyzer::new(Some(shared), DEFAULT_FRAME_COUNT)
    }

    #[tokio::test]
    async fn test_persisted_result_uses_store_id() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let analyzer = analyzer_with(&store);

        let result = analyzer.analyze("clip.mp4", b"frames").await.unwrap();

        assert!(result.is_persisted());
        let stored = store.list_recent(1).await.unwrap();
        assert_eq!(stored[0].id, result.job_id);
        assert_eq!(stored[0].job.filehash, result.filehash);
    }

    #[tokio::test]
    async fn test_failing_store_yields_temporary_id() {
        let store = Arc::new(MemoryAnalysisStore::new());
        store.set_available(false);
        let analyzer = analyzer_with(&store);

        let result = analyzer.analyze("clip.mp4", b"frames").await.unwrap();

        assert_eq!(result.job_id, TEMPORARY_JOB_ID);
        assert_eq!(result.frame_scores.len(), DEFAULT_FRAME_COUNT);
        assert!(result.deepfake_likelihood > 0.0);
    }

    #[tokio::test]
    async fn test_no_store_yields_temporary_id() {
        let analyzer = Analyzer::new(None, 12);
        let result = analyzer.analyze("clip.avi", b"frames").await.unwrap();

        assert_eq!(result.job_id, TEMPORARY_JOB_ID);
        assert_eq!(result.frame_scores.len(), 12);
        assert!(analyzer.recent(10).await.is_empty());
        assert!(analyzer.check_store().await.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_file_is_not_persisted() {
        let store = Arc::new(CallLog::default());
        let analyzer = analyzer_with(&store);

        let err = analyzer.analyze("clip.mov", b"frames").await.unwrap_err();

        assert!(matches!(err, DeeptraceError::UnsupportedFileType(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_each_call_creates_a_new_record() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let analyzer = analyzer_with(&store);

        let a = analyzer.analyze("clip.mp4", b"same").await.unwrap();
        let b = analyzer.analyze("clip.mp4", b"same").await.unwrap();

        assert_ne!(a.job_id, b.job_id);
        assert_eq!(a.filehash, b.filehash);
        assert_eq!(store.job_count().await, 2);
    }

    #[tokio::test]
    async fn test_recent_tolerates_failing_store() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let analyzer = analyzer_with(&store);
        analyzer.analyze("clip.mp4", b"one").await.unwrap();

        assert_eq!(analyzer.recent(10).await.len(), 1);
        store.set_available(false);
        assert!(analyzer.recent(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_persisted_analysis_makes_exactly_one_store_call() {
        let store = Arc::new(CallLog::default());
        let analyzer = analyzer_with(&store);

        let result = analyzer.analyze("clip.mp4", b"one").await.unwrap();

        assert!(result.is_persisted());
        assert_eq!(store.calls(), vec!["create"]);
        assert_eq!(store.inner.job_count().await, 1);
    }

    #[tokio::test]
    async fn test_stalled_store_yields_temporary_id() {
        let store = Arc::new(CallLog::stalling(Duration::from_secs(30)));
        let analyzer = analyzer_with(&store).with_store_timeout(Duration::from_millis(50));

        let started = std::time::Instant::now();
        let result = analyzer.analyze("clip.mp4", b"frames").await.unwrap();

        assert_eq!(result.job_id, TEMPORARY_JOB_ID);
        assert_eq!(result.frame_scores.len(), DEFAULT_FRAME_COUNT);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(store.calls(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_stalled_store_reads_give_up() {
        let store = Arc::new(CallLog::stalling(Duration::from_secs(30)));
        let analyzer = analyzer_with(&store).with_store_timeout(Duration::from_millis(50));

        assert!(analyzer.recent(10).await.is_empty());
        assert!(matches!(
            analyzer.check_store().await,
            Some(Err(StoreError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_persist_outcome_job_id() {
        let ok = PersistOutcome::Persisted {
            job_id: "abc".into(),
        };
        assert_eq!(ok.job_id(), "abc");
        assert_eq!(PersistOutcome::NotConfigured.job_id(), TEMPORARY_JOB_ID);
        assert_eq!(
            PersistOutcome::Failed(StoreError::Unavailable("down".into())).job_id(),
            TEMPORARY_JOB_ID
        );
    }
}
