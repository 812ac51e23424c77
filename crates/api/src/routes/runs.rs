use axum::routing::get;
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/runs`.
///
/// ```text
/// GET    /                              -> list_runs
/// POST   /                              -> submit_run
/// GET    /{run_id}                      -> get_run
/// GET    /{run_id}/artifacts            -> list_artifacts
/// GET    /{run_id}/artifacts/{kind}     -> get_artifact
/// GET    /{run_id}/jobs                 -> list_jobs
/// GET    /{run_id}/tasks                -> list_tasks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(runs::list_runs).post(runs::submit_run))
        .route("/{run_id}", get(runs::get_run))
        .route("/{run_id}/artifacts", get(runs::list_artifacts))
        .route("/{run_id}/artifacts/{kind}", get(runs::get_artifact))
        .route("/{run_id}/jobs", get(runs::list_jobs))
        .route("/{run_id}/tasks", get(runs::list_tasks))
}
