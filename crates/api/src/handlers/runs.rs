//! Handlers for the `/runs` resource.

use adapt_cloud::StorageError;
use adapt_core::artifacts::ArtifactKind;
use adapt_core::error::CoreError;
use adapt_core::run::RunStage;
use adapt_core::types::DbId;
use adapt_db::models::job::Job;
use adapt_db::models::run::{PipelineRun, RunListQuery};
use adapt_db::repositories::{ArtifactRepo, HitlTaskRepo, JobRepo, PipelineRunRepo};
use adapt_pipeline::SubmitRun;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A run together with its stage name.
#[derive(Debug, Serialize)]
pub struct RunView {
    #[serde(flatten)]
    pub run: PipelineRun,
    pub stage: &'static str,
}

impl TryFrom<PipelineRun> for RunView {
    type Error = CoreError;

    fn try_from(run: PipelineRun) -> Result<Self, Self::Error> {
        let stage = run.stage()?.name();
        Ok(Self { run, stage })
    }
}

#[derive(Debug, Serialize)]
pub struct SubmittedRun {
    pub run: RunView,
    pub job: Job,
}

pub(crate) async fn find_run(state: &AppState, run_id: DbId) -> AppResult<PipelineRun> {
    PipelineRunRepo::find_by_id(&state.pool, run_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "pipeline_run",
            id: run_id,
        }))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/runs
///
/// Create a run from product inputs (or a catalog `creative_id`) and
/// enqueue its analysis job. Returns 201.
pub async fn submit_run(
    State(state): State<AppState>,
    Json(input): Json<SubmitRun>,
) -> AppResult<impl IntoResponse> {
    let (run, job) = adapt_pipeline::submit_run(
        &state.pool,
        &state.store,
        &state.event_bus,
        &state.pipeline,
        input,
    )
    .await?;

    tracing::info!(
        run_id = run.id,
        run_key = %run.run_key,
        job_id = job.id,
        "Run submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedRun {
                run: run.try_into()?,
                job,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/runs?stage=&limit=&offset=
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<RunListQuery>,
) -> AppResult<impl IntoResponse> {
    let stage = params
        .stage
        .as_deref()
        .map(RunStage::from_name)
        .transpose()?;
    let runs = PipelineRunRepo::list(&state.pool, stage, &params)
        .await?
        .into_iter()
        .map(RunView::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse { data: runs }))
}

/// GET /api/v1/runs/{run_id}
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let run = find_run(&state, run_id).await?;
    Ok(Json(DataResponse {
        data: RunView::try_from(run)?,
    }))
}

/// GET /api/v1/runs/{run_id}/artifacts
pub async fn list_artifacts(
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_run(&state, run_id).await?;
    let artifacts = ArtifactRepo::list_for_run(&state.pool, run_id).await?;
    Ok(Json(DataResponse { data: artifacts }))
}

/// GET /api/v1/runs/{run_id}/artifacts/{kind}
///
/// JSON artifacts are returned inside the data envelope; everything else
/// (the final video, gate markers) is streamed with its stored content type.
pub async fn get_artifact(
    State(state): State<AppState>,
    Path((run_id, kind)): Path<(DbId, String)>,
) -> AppResult<Response> {
    let kind = ArtifactKind::from_name(&kind)?;
    find_run(&state, run_id).await?;
    let record = ArtifactRepo::find(&state.pool, run_id, kind)
        .await?
        .ok_or_else(|| {
            AppError::Storage(StorageError::NotFound(format!(
                "{} for run {run_id}",
                kind.name()
            )))
        })?;

    let bytes = state.store.get(&record.uri).await?;
    if kind.is_json() {
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::InternalError(format!("Artifact {} is not valid JSON: {e}", record.uri))
        })?;
        return Ok(Json(DataResponse { data: value }).into_response());
    }
    Ok(([(CONTENT_TYPE, record.content_type)], bytes).into_response())
}

/// GET /api/v1/runs/{run_id}/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_run(&state, run_id).await?;
    let jobs = JobRepo::list_for_run(&state.pool, run_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/runs/{run_id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_run(&state, run_id).await?;
    let tasks = HitlTaskRepo::list_for_run(&state.pool, run_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}
