//! Run artifact records.

use adapt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `run_artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunArtifact {
    pub id: DbId,
    pub run_id: DbId,
    pub kind: String,
    pub uri: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
