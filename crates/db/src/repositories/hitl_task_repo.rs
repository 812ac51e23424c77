//! Repository for the `hitl_tasks` table.

use adapt_core::artifacts::ArtifactKind;
use adapt_core::job::JobType;
use adapt_core::run::RunStage;
use adapt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::artifact::RunArtifact;
use crate::models::hitl_task::{CreateHitlTask, HitlTask, TaskDecision};
use crate::models::status::HitlTaskStatus;
use crate::repositories::artifact_repo::ArtifactRepo;
use crate::repositories::job_repo::JobRepo;
use crate::repositories::run_repo::PipelineRunRepo;

/// Column list for `hitl_tasks` queries.
const COLUMNS: &str = "\
    id, run_id, task_name, status_id, assignee, input_artifacts, \
    decided_by, decision_comment, decided_at, created_at, updated_at";

/// Provides persistence for HITL review tasks.
pub struct HitlTaskRepo;

impl HitlTaskRepo {
    /// Pause a run at a checkpoint: move the run from `from` to `awaiting`
    /// and insert the pending task, in one transaction.
    ///
    /// Returns `None` (and changes nothing) if the run was not in `from`.
    pub async fn open_checkpoint(
        pool: &PgPool,
        from: RunStage,
        awaiting: RunStage,
        input: &CreateHitlTask,
    ) -> Result<Option<HitlTask>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let moved = PipelineRunRepo::transition_inner(&mut tx, input.run_id, from, awaiting).await?;
        if moved.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO hitl_tasks (run_id, task_name, status_id, assignee, input_artifacts) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, HitlTask>(&query)
            .bind(input.run_id)
            .bind(&input.task_name)
            .bind(HitlTaskStatus::Pending.id())
            .bind(&input.assignee)
            .bind(&input.input_artifacts)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<HitlTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hitl_tasks WHERE id = $1");
        sqlx::query_as::<_, HitlTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Pending tasks, oldest first.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<HitlTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hitl_tasks WHERE status_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, HitlTask>(&query)
            .bind(HitlTaskStatus::Pending.id())
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_run(pool: &PgPool, run_id: DbId) -> Result<Vec<HitlTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hitl_tasks WHERE run_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, HitlTask>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    /// Lock a pending task so it can be decided.
    ///
    /// Returns `None` if the task does not exist or is no longer pending. A
    /// concurrent claim on the same task waits for this one to finish and
    /// then sees the decided row.
    pub async fn claim_pending(pool: &PgPool, id: DbId) -> Result<Option<ClaimedTask>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "SELECT {COLUMNS} FROM hitl_tasks WHERE id = $1 AND status_id = $2 FOR UPDATE"
        );
        let task = sqlx::query_as::<_, HitlTask>(&query)
            .bind(id)
            .bind(HitlTaskStatus::Pending.id())
            .fetch_optional(&mut *tx)
            .await?;
        match task {
            Some(task) => Ok(Some(ClaimedTask { tx, task })),
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Decide a task and move its run on, atomically. When `next_job` is
    /// given it is enqueued in the same transaction.
    ///
    /// Returns `None` and rolls back if the task was no longer pending or the
    /// run was no longer in `from`.
    pub async fn resolve_checkpoint(
        pool: &PgPool,
        task_id: DbId,
        decision: &TaskDecision<'_>,
        from: RunStage,
        to: RunStage,
        next_job: Option<JobType>,
    ) -> Result<Option<HitlTask>, sqlx::Error> {
        match Self::claim_pending(pool, task_id).await? {
            Some(claim) => claim.resolve(decision, from, to, next_job).await,
            None => Ok(None),
        }
    }

    fn decide_query() -> String {
        format!(
            "UPDATE hitl_tasks \
             SET status_id = $2, decided_by = $3, decision_comment = $4, decided_at = NOW() \
             WHERE id = $1 AND status_id = $5 \
             RETURNING {COLUMNS}"
        )
    }
}

/// A pending task locked by [`HitlTaskRepo::claim_pending`].
///
/// Dropping the claim without resolving it rolls back everything recorded
/// through it and releases the task.
pub struct ClaimedTask {
    tx: Transaction<'static, Postgres>,
    pub task: HitlTask,
}

impl ClaimedTask {
    /// Record an artifact of the task's run as part of the decision.
    pub async fn record_artifact(
        &mut self,
        kind: ArtifactKind,
        uri: &str,
        size_bytes: i64,
    ) -> Result<RunArtifact, sqlx::Error> {
        ArtifactRepo::upsert_inner(&mut self.tx, self.task.run_id, kind, uri, size_bytes).await
    }

    /// Apply the decision, move the run from `from` to `to` and enqueue
    /// `next_job`, then commit.
    ///
    /// Returns `None` and rolls back if the run was no longer in `from`.
    pub async fn resolve(
        self,
        decision: &TaskDecision<'_>,
        from: RunStage,
        to: RunStage,
        next_job: Option<JobType>,
    ) -> Result<Option<HitlTask>, sqlx::Error> {
        let Self { mut tx, task } = self;

        let query = HitlTaskRepo::decide_query();
        let decided = sqlx::query_as::<_, HitlTask>(&query)
            .bind(task.id)
            .bind(decision.status.id())
            .bind(decision.decided_by)
            .bind(decision.comment)
            .bind(HitlTaskStatus::Pending.id())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(decided) = decided else {
            tx.rollback().await?;
            return Ok(None);
        };

        let moved = PipelineRunRepo::transition_inner(&mut tx, decided.run_id, from, to).await?;
        if moved.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(job_type) = next_job {
            JobRepo::submit_inner(&mut tx, decided.run_id, job_type, &serde_json::json!({})).await?;
        }

        tx.commit().await?;
        Ok(Some(decided))
    }
}
