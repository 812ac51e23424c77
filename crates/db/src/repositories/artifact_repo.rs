//! Repository for the `run_artifacts` table.

use adapt_core::artifacts::ArtifactKind;
use adapt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::artifact::RunArtifact;

const COLUMNS: &str = "id, run_id, kind, uri, content_type, size_bytes, created_at, updated_at";

/// Records which files a run has written to object storage.
pub struct ArtifactRepo;

impl ArtifactRepo {
    /// Insert or replace the record for `(run_id, kind)`.
    pub async fn upsert(
        pool: &PgPool,
        run_id: DbId,
        kind: ArtifactKind,
        uri: &str,
        size_bytes: i64,
    ) -> Result<RunArtifact, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let artifact = Self::upsert_inner(&mut tx, run_id, kind, uri, size_bytes).await?;
        tx.commit().await?;
        Ok(artifact)
    }

    pub(crate) async fn upsert_inner(
        tx: &mut Transaction<'_, Postgres>,
        run_id: DbId,
        kind: ArtifactKind,
        uri: &str,
        size_bytes: i64,
    ) -> Result<RunArtifact, sqlx::Error> {
        let query = format!(
            "INSERT INTO run_artifacts (run_id, kind, uri, content_type, size_bytes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_run_artifacts_run_id_kind DO UPDATE \
             SET uri = EXCLUDED.uri, \
                 content_type = EXCLUDED.content_type, \
                 size_bytes = EXCLUDED.size_bytes \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RunArtifact>(&query)
            .bind(run_id)
            .bind(kind.name())
            .bind(uri)
            .bind(kind.content_type())
            .bind(size_bytes)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<RunArtifact>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM run_artifacts WHERE run_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, RunArtifact>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        run_id: DbId,
        kind: ArtifactKind,
    ) -> Result<Option<RunArtifact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM run_artifacts WHERE run_id = $1 AND kind = $2");
        sqlx::query_as::<_, RunArtifact>(&query)
            .bind(run_id)
            .bind(kind.name())
            .fetch_optional(pool)
            .await
    }
}
