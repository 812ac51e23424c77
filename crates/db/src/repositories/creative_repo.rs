//! Repository for the `creatives` catalog.

use adapt_core::creative::CreativeRecord;
use adapt_core::types::DbId;
use sqlx::PgPool;

use crate::models::creative::Creative;

const COLUMNS: &str = "id, title, image_url, landing_page_url, created_at, updated_at";

pub struct CreativeRepo;

impl CreativeRepo {
    /// Import catalog rows. A row matching an existing `(title, image_url)`
    /// updates its landing page instead of duplicating it.
    pub async fn insert_many(
        pool: &PgPool,
        records: &[CreativeRecord],
    ) -> Result<Vec<Creative>, sqlx::Error> {
        let query = format!(
            "INSERT INTO creatives (title, image_url, landing_page_url) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_creatives_title_image_url DO UPDATE \
             SET landing_page_url = EXCLUDED.landing_page_url \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let row = sqlx::query_as::<_, Creative>(&query)
                .bind(&record.title)
                .bind(&record.image_url)
                .bind(&record.landing_page_url)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Creative>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM creatives ORDER BY title ASC, id ASC LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Creative>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Creative>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creatives WHERE id = $1");
        sqlx::query_as::<_, Creative>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
