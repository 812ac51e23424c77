//! Pipeline run entity and DTOs.

use adapt_core::error::CoreError;
use adapt_core::run::RunStage;
use adapt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `pipeline_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineRun {
    pub id: DbId,
    pub run_key: String,
    pub stage_id: StatusId,
    pub creative_id: Option<DbId>,
    pub campaign_id: String,
    pub product_id: String,
    pub product_description: String,
    pub landing_page_url: Option<String>,
    pub creative_title: Option<String>,
    pub image_uris: serde_json::Value,
    pub artifact_root: String,
    pub final_video_uri: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<serde_json::Value>,
    pub submitted_by: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PipelineRun {
    pub fn stage(&self) -> Result<RunStage, CoreError> {
        RunStage::from_id(self.stage_id)
    }

    /// Brand image URIs; a malformed column reads as no images.
    pub fn image_uri_list(&self) -> Vec<String> {
        serde_json::from_value(self.image_uris.clone()).unwrap_or_default()
    }
}

/// DTO for inserting a new run.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRun {
    pub run_key: String,
    pub creative_id: Option<DbId>,
    pub campaign_id: String,
    pub product_id: String,
    pub product_description: String,
    pub landing_page_url: Option<String>,
    pub creative_title: Option<String>,
    pub image_uris: Vec<String>,
    pub artifact_root: String,
    pub submitted_by: Option<String>,
}

/// Query parameters for `GET /api/v1/runs`.
#[derive(Debug, Default, Deserialize)]
pub struct RunListQuery {
    /// Filter by stage name (e.g. `awaiting_prompt_review`).
    pub stage: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
