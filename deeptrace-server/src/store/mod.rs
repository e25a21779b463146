//! Record store module for persisting analysis jobs.
//!
//! The store is an optional collaborator: the server runs without one, and
//! every caller treats a failing store as "nothing persisted" rather than as a
//! request failure.
//!
//! - [`PostgresAnalysisStore`] persists to the `analysisjob` table
//! - [`MemoryAnalysisStore`] keeps records in process memory (development and tests)

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryAnalysisStore;
pub use postgres::PostgresAnalysisStore;

use std::sync::Arc;

use async_trait::async_trait;
use deeptrace_core::AnalysisJob;
use serde::Serialize;

use crate::config::Config;

/// Name of the collection (table) holding analysis jobs.
pub const ANALYSIS_COLLECTION: &str = "analysisjob";

/// Name of the collection (table) reserved for user activity.
pub const ACTIVITY_COLLECTION: &str = "useractivity";

/// An analysis job together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedJob {
    pub id: String,
    #[serde(flatten)]
    pub job: AnalysisJob,
}

/// Persistence backend for analysis records.
///
/// Implementations must be thread-safe (`Send + Sync`); one instance is
/// shared by every request.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Insert a job and return its new identifier.
    async fn create(&self, job: &AnalysisJob) -> Result<String, StoreError>;

    /// The most recent jobs, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<PersistedJob>, StoreError>;

    /// Names of the collections the backend holds.
    async fn collections(&self) -> Result<Vec<String>, StoreError>;
}

/// Shared handle to a record store.
pub type SharedStore = Arc<dyn AnalysisStore>;

/// Build the record store described by the configuration.
///
/// A configured database is always returned, even when it cannot be reached
/// yet: connections are opened on demand, so requests degrade individually and
/// persistence resumes once the database answers. `None` means no backend is
/// configured or the database URL is malformed.
pub async fn connect(config: &Config) -> Option<SharedStore> {
    match &config.database_url {
        Some(url) => {
            let store = match PostgresAnalysisStore::connect_lazy(
                url,
                config.database_max_connections,
                config.store_timeout(),
            ) {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(error = %e, "Invalid DATABASE_URL, analyses will not be persisted");
                    return None;
                }
            };

            match store.ensure_migrated().await {
                Ok(()) => tracing::info!("Record store: PostgreSQL"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Record store: PostgreSQL (unreachable, retrying on first use)"
                ),
            }
            Some(Arc::new(store))
        }
        None if config.in_memory_store => {
            tracing::warn!("Record store: in-memory (records are lost on restart)");
            Some(Arc::new(MemoryAnalysisStore::new()))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, analyses will not be persisted");
            None
        }
    }
}
