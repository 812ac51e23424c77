//! Handlers for HITL review tasks.
//!
//! Reviewers are identified by the `reviewer` field of the request body.

use std::collections::BTreeMap;

use adapt_core::error::CoreError;
use adapt_core::hitl::{TASK_ANALYSIS_REVIEW, TASK_PROMPT_REVIEW};
use adapt_core::types::DbId;
use adapt_db::models::hitl_task::HitlTask;
use adapt_db::models::status::HitlTaskStatus;
use adapt_db::repositories::HitlTaskRepo;
use adapt_pipeline::review::{AnalysisEdits, PromptEdits, ReviewOutcome};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::runs::RunView;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub reviewer: String,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    /// Checkpoint-specific edits: `{usp, style}` for analysis review,
    /// `{brief, video_prompt}` for prompt review.
    #[serde(default)]
    pub edits: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub reviewer: String,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: HitlTask,
    pub status: &'static str,
}

impl From<HitlTask> for TaskView {
    fn from(task: HitlTask) -> Self {
        let status = HitlTaskStatus::from_id(task.status_id)
            .map(HitlTaskStatus::name)
            .unwrap_or("unknown");
        Self { task, status }
    }
}

/// A task with the contents of the artifacts it asks the reviewer to check.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskView,
    pub artifacts: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub task: TaskView,
    pub run: RunView,
}

impl TryFrom<ReviewOutcome> for DecisionResponse {
    type Error = CoreError;

    fn try_from(outcome: ReviewOutcome) -> Result<Self, Self::Error> {
        Ok(Self {
            task: outcome.task.into(),
            run: outcome.run.try_into()?,
        })
    }
}

async fn find_task(state: &AppState, task_id: DbId) -> AppResult<HitlTask> {
    HitlTaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "hitl_task",
            id: task_id,
        }))
}

/// Missing or `null` edits approve the drafts unchanged.
fn parse_edits<T: DeserializeOwned + Default>(edits: serde_json::Value) -> AppResult<T> {
    if edits.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(edits).map_err(|e| AppError::BadRequest(format!("Invalid edits: {e}")))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/pending
pub async fn list_pending(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tasks: Vec<TaskView> = HitlTaskRepo::list_pending(&state.pool)
        .await?
        .into_iter()
        .map(TaskView::from)
        .collect();
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{task_id}
///
/// Loads every input artifact from storage so the reviewer sees the drafts
/// alongside the task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, task_id).await?;

    let inputs: Vec<(String, String)> = task
        .input_artifacts
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(kind, uri)| Some((kind.clone(), uri.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let loaded = futures::future::try_join_all(inputs.into_iter().map(|(kind, uri)| {
        let store = state.store.clone();
        async move {
            let value = store.get_json::<serde_json::Value>(&uri).await?;
            Ok::<_, AppError>((kind, value))
        }
    }))
    .await?;

    Ok(Json(DataResponse {
        data: TaskDetail {
            task: task.into(),
            artifacts: loaded.into_iter().collect(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Decide
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{task_id}/approve
///
/// Persists the approved artifacts (with any edits), opens the gate and
/// enqueues the next stage.
pub async fn approve_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(body): Json<ApproveTaskRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let task = find_task(&state, task_id).await?;
    let comment = body.comment.as_deref();

    let outcome = match task.task_name.as_str() {
        TASK_ANALYSIS_REVIEW => {
            let edits: AnalysisEdits = parse_edits(body.edits)?;
            state
                .review
                .approve_analysis(task_id, &body.reviewer, comment, edits)
                .await?
        }
        TASK_PROMPT_REVIEW => {
            let edits: PromptEdits = parse_edits(body.edits)?;
            state
                .review
                .approve_prompt(task_id, &body.reviewer, comment, edits)
                .await?
        }
        other => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Task {task_id} has unknown name '{other}'"
            ))))
        }
    };

    tracing::info!(
        task_id,
        run_id = outcome.run.id,
        reviewer = %body.reviewer,
        "Task approved",
    );
    Ok(Json(DataResponse {
        data: DecisionResponse::try_from(outcome)?,
    }))
}

/// POST /api/v1/tasks/{task_id}/reject
///
/// Rejection ends the run; a comment is required.
pub async fn reject_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(body): Json<RejectTaskRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let outcome = state
        .review
        .reject(task_id, &body.reviewer, &body.comment)
        .await?;

    tracing::info!(
        task_id,
        run_id = outcome.run.id,
        reviewer = %body.reviewer,
        "Task rejected",
    );
    Ok(Json(DataResponse {
        data: DecisionResponse::try_from(outcome)?,
    }))
}
