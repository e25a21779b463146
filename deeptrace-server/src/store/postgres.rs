//! PostgreSQL implementation of the record store.
//!
//! The pool connects on demand. Migrations run at startup when the database
//! answers, otherwise before the first query that reaches it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deeptrace_core::{AnalysisJob, FrameScore, JobStatus, VerificationRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AnalysisStore, PersistedJob, StoreError};

/// PostgreSQL-backed analysis store.
#[derive(Clone)]
pub struct PostgresAnalysisStore {
    pool: PgPool,
    migrated: Arc<AtomicBool>,
}

/// Row type for `analysisjob` queries.
#[derive(FromRow)]
struct AnalysisJobRow {
    id: Uuid,
    filename: String,
    filesize: i64,
    filehash: String,
    status: String,
    accuracy: f64,
    deepfake_likelihood: f64,
    model: String,
    frame_scores: Json<Vec<FrameScore>>,
    analyzed_at: Option<DateTime<Utc>>,
    verification: Option<Json<VerificationRecord>>,
}

impl TryFrom<AnalysisJobRow> for PersistedJob {
    type Error = StoreError;

    fn try_from(row: AnalysisJobRow) -> Result<Self, Self::Error> {
        let status: JobStatus = row.status.parse().map_err(StoreError::Serialization)?;
        let filesize = u64::try_from(row.filesize)
            .map_err(|_| StoreError::Serialization(format!("negative filesize {}", row.filesize)))?;

        Ok(Self {
            id: row.id.to_string(),
            job: AnalysisJob {
                filename: row.filename,
                filesize,
                filehash: row.filehash,
                status,
                accuracy: row.accuracy,
                deepfake_likelihood: row.deepfake_likelihood,
                model: row.model,
                frame_scores: row.frame_scores.0,
                analyzed_at: row.analyzed_at,
                verification: row.verification.map(|v| v.0),
            },
        })
    }
}

impl PostgresAnalysisStore {
    /// Build a pool without opening a connection.
    ///
    /// Only a malformed URL fails here. Waiting for a pooled connection is
    /// bounded by `acquire_timeout`.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            migrated: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Apply pending migrations unless a previous call already did.
    pub async fn ensure_migrated(&self) -> Result<(), StoreError> {
        if self.migrated.load(Ordering::Acquire) {
            return Ok(());
        }

        sqlx::migrate!("./migrations").run(&self.pool).await?;
        self.migrated.store(true, Ordering::Release);

        tracing::info!("Record store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for PostgresAnalysisStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, job: &AnalysisJob) -> Result<String, StoreError> {
        self.ensure_migrated().await?;

        let filesize = i64::try_from(job.filesize)
            .map_err(|_| StoreError::Serialization(format!("filesize {} too large", job.filesize)))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO analysisjob (
                filename, filesize, filehash, status, accuracy,
                deepfake_likelihood, model, frame_scores, analyzed_at, verification
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&job.filename)
        .bind(filesize)
        .bind(&job.filehash)
        .bind(job.status.as_str())
        .bind(job.accuracy)
        .bind(job.deepfake_likelihood)
        .bind(&job.model)
        .bind(Json(&job.frame_scores))
        .bind(job.analyzed_at)
        .bind(job.verification.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(job_id = %id, filehash = %job.filehash, "Stored analysis job");

        Ok(id.to_string())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PersistedJob>, StoreError> {
        self.ensure_migrated().await?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<AnalysisJobRow> = sqlx::query_as(
            r#"
            SELECT id, filename, filesize, filehash, status, accuracy,
                   deepfake_likelihood, model, frame_scores, analyzed_at, verification
            FROM analysisjob
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PersistedJob::try_from).collect()
    }

    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_migrated().await?;

        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name NOT LIKE '\_sqlx%'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
