//! HITL review task entity and DTOs.

use adapt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `hitl_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HitlTask {
    pub id: DbId,
    pub run_id: DbId,
    pub task_name: String,
    pub status_id: StatusId,
    pub assignee: String,
    /// Map of artifact kind name to URI the reviewer needs to look at.
    pub input_artifacts: serde_json::Value,
    pub decided_by: Option<String>,
    pub decision_comment: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for opening a checkpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHitlTask {
    pub run_id: DbId,
    pub task_name: String,
    pub assignee: String,
    pub input_artifacts: serde_json::Value,
}

/// A reviewer's decision on a task.
#[derive(Debug, Clone)]
pub struct TaskDecision<'a> {
    pub status: super::status::HitlTaskStatus,
    pub decided_by: &'a str,
    pub comment: Option<&'a str>,
}
