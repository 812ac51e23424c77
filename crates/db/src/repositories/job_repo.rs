//! Repository for the `jobs` table.
//!
//! Jobs are never retried automatically: a failed job stays failed and its
//! run is marked failed by the worker.

use adapt_core::job::JobType;
use adapt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::job::Job;
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, run_id, job_type, status_id, worker_name, parameters, result, \
    error_message, error_details, submitted_at, claimed_at, started_at, \
    completed_at, created_at, updated_at";

/// Provides persistence for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Enqueue a pending job for a run.
    pub async fn submit(
        pool: &PgPool,
        run_id: DbId,
        job_type: JobType,
        parameters: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let job = Self::submit_inner(&mut tx, run_id, job_type, parameters).await?;
        tx.commit().await?;
        Ok(job)
    }

    pub(crate) async fn submit_inner(
        tx: &mut Transaction<'_, Postgres>,
        run_id: DbId,
        job_type: JobType,
        parameters: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (run_id, job_type, status_id, parameters) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(run_id)
            .bind(job_type.as_str())
            .bind(JobStatus::Pending.id())
            .bind(parameters)
            .fetch_one(&mut **tx)
            .await
    }

    /// Atomically claim the oldest pending job for a worker.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
    /// claim the same job.
    pub async fn claim_next(pool: &PgPool, worker_name: &str) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET worker_name = $1, claimed_at = NOW(), status_id = $2 \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id = $3 AND claimed_at IS NULL \
                 ORDER BY submitted_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(worker_name)
            .bind(JobStatus::Running.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Set `started_at` when a claimed job begins executing.
    pub async fn mark_started(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET started_at = NOW(), status_id = $2 WHERE id = $1")
            .bind(job_id)
            .bind(JobStatus::Running.id())
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET status_id = $2, result = $3, completed_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        error: &str,
        details: Option<&serde_json::Value>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, error_details = $4, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(details)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_run(pool: &PgPool, run_id: DbId) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs WHERE run_id = $1 ORDER BY submitted_at ASC, id ASC"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }
}
