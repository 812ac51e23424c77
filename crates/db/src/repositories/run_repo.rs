//! Repository for the `pipeline_runs` table.
//!
//! Stage changes are compare-and-set: every transition names the stage the
//! run is expected to be in, and matches zero rows if another actor moved it
//! first.

use adapt_core::run::RunStage;
use adapt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::run::{CreateRun, PipelineRun, RunListQuery};

/// Column list for `pipeline_runs` queries.
pub(crate) const COLUMNS: &str = "\
    id, run_key, stage_id, creative_id, campaign_id, product_id, \
    product_description, landing_page_url, creative_title, image_uris, \
    artifact_root, final_video_uri, error_message, error_details, \
    submitted_by, completed_at, created_at, updated_at";

/// Maximum page size for run listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for run listing.
const DEFAULT_LIMIT: i64 = 50;

/// Terminal stages: completed, failed, rejected.
const TERMINAL_STAGES: [i16; 3] = [
    RunStage::Completed as i16,
    RunStage::Failed as i16,
    RunStage::Rejected as i16,
];

/// Provides persistence for pipeline runs.
pub struct PipelineRunRepo;

impl PipelineRunRepo {
    /// Insert a new run in the `pending` stage.
    pub async fn create(pool: &PgPool, input: &CreateRun) -> Result<PipelineRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO pipeline_runs \
                (run_key, stage_id, creative_id, campaign_id, product_id, product_description, \
                 landing_page_url, creative_title, image_uris, artifact_root, submitted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(&input.run_key)
            .bind(RunStage::Pending.id())
            .bind(input.creative_id)
            .bind(&input.campaign_id)
            .bind(&input.product_id)
            .bind(&input.product_description)
            .bind(&input.landing_page_url)
            .bind(&input.creative_title)
            .bind(serde_json::json!(input.image_uris))
            .bind(&input.artifact_root)
            .bind(&input.submitted_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PipelineRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pipeline_runs WHERE id = $1");
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        run_key: &str,
    ) -> Result<Option<PipelineRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pipeline_runs WHERE run_key = $1");
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(run_key)
            .fetch_optional(pool)
            .await
    }

    /// List runs newest-first, optionally filtered to one stage.
    pub async fn list(
        pool: &PgPool,
        stage: Option<RunStage>,
        params: &RunListQuery,
    ) -> Result<Vec<PipelineRun>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM pipeline_runs \
             WHERE ($1::SMALLINT IS NULL OR stage_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(stage.map(RunStage::id))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a run from `from` to `to`. Returns `None` when the run is not
    /// currently in `from`.
    ///
    /// Callers validate the transition with
    /// [`adapt_core::run::validate_transition`] first.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: RunStage,
        to: RunStage,
    ) -> Result<Option<PipelineRun>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let run = Self::transition_inner(&mut tx, id, from, to).await?;
        tx.commit().await?;
        Ok(run)
    }

    pub(crate) async fn transition_inner(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        from: RunStage,
        to: RunStage,
    ) -> Result<Option<PipelineRun>, sqlx::Error> {
        let query = format!(
            "UPDATE pipeline_runs \
             SET stage_id = $3, \
                 completed_at = CASE WHEN $4 THEN NOW() ELSE completed_at END \
             WHERE id = $1 AND stage_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(to.is_terminal())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Mark a non-terminal run as failed with error details.
    ///
    /// Returns `false` if the run was already in a terminal stage.
    pub async fn fail(
        pool: &PgPool,
        id: DbId,
        message: &str,
        details: Option<&serde_json::Value>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pipeline_runs \
             SET stage_id = $2, error_message = $3, error_details = $4, completed_at = NOW() \
             WHERE id = $1 AND stage_id NOT IN ($5, $6, $7)",
        )
        .bind(id)
        .bind(RunStage::Failed.id())
        .bind(message)
        .bind(details)
        .bind(TERMINAL_STAGES[0])
        .bind(TERMINAL_STAGES[1])
        .bind(TERMINAL_STAGES[2])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the location of the generated video.
    pub async fn set_final_video(pool: &PgPool, id: DbId, uri: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE pipeline_runs SET final_video_uri = $2 WHERE id = $1")
            .bind(id)
            .bind(uri)
            .execute(pool)
            .await?;
        Ok(())
    }
}
