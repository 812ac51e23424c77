//! Creative catalog entity.

use adapt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `creatives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Creative {
    pub id: DbId,
    pub title: String,
    pub image_url: String,
    pub landing_page_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
