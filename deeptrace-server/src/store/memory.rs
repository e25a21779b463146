//! In-memory record store
//!
//! Keeps jobs in insertion order. Used when no database is configured and by
//! tests, which can switch the store off to simulate an unreachable backend.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use deeptrace_core::AnalysisJob;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AnalysisStore, PersistedJob, StoreError, ACTIVITY_COLLECTION, ANALYSIS_COLLECTION};

/// Process-local analysis store
pub struct MemoryAnalysisStore {
    jobs: RwLock<Vec<PersistedJob>>,
    available: AtomicBool,
}

impl Default for MemoryAnalysisStore {
    fn default() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryAnalysisStore {
    /// Create an empty, available store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability. While unavailable every operation fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Number of stored jobs
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, job: &AnalysisJob) -> Result<String, StoreError> {
        self.ensure_available()?;

        let id = Uuid::new_v4().to_string();
        self.jobs.write().await.push(PersistedJob {
            id: id.clone(),
            job: job.clone(),
        });

        tracing::debug!(job_id = %id, "Stored analysis job in memory");
        Ok(id)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PersistedJob>, StoreError> {
        self.ensure_available()?;

        let jobs = self.jobs.read().await;
        Ok(jobs.iter().rev().take(limit).cloned().collect())
    }

    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_available()?;
        Ok(vec![
            ANALYSIS_COLLECTION.to_string(),
            ACTIVITY_COLLECTION.to_string(),
        ])
    }
}

impl std::fmt::Debug for MemoryAnalysisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAnalysisStore")
            .field("available", &self.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use deeptrace_core::MediaAnalysis;

    fn job(name: &str) -> AnalysisJob {
        MediaAnalysis::run(name, name.as_bytes(), 4, Utc::now())
            .unwrap()
            .to_job()
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = MemoryAnalysisStore::new();
        let a = store.create(&job("a.mp4")).await.unwrap();
        let b = store.create(&job("b.mp4")).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.job_count().await, 2);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_limited() {
        let store = MemoryAnalysisStore::new();
        for name in ["1.mp4", "2.mp4", "3.mp4"] {
            store.create(&job(name)).await.unwrap();
        }

        let recent = store.list_recent(2).await.unwrap();
        let names: Vec<_> = recent.iter().map(|r| r.job.filename.as_str()).collect();
        assert_eq!(names, vec!["3.mp4", "2.mp4"]);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_operation() {
        let store = MemoryAnalysisStore::new();
        store.set_available(false);

        assert!(matches!(
            store.create(&job("a.mp4")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.list_recent(10).await.is_err());
        assert!(store.collections().await.is_err());
        assert_eq!(store.job_count().await, 0);

        store.set_available(true);
        assert!(store.create(&job("a.mp4")).await.is_ok());
    }
}
