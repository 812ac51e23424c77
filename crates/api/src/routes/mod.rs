pub mod creatives;
pub mod health;
pub mod runs;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /runs                               submit, list
/// /runs/{run_id}                      detail
/// /runs/{run_id}/artifacts            recorded artifacts
/// /runs/{run_id}/artifacts/{kind}     artifact content
/// /runs/{run_id}/jobs                 jobs
/// /runs/{run_id}/tasks                review tasks
///
/// /tasks/pending                      open review tasks
/// /tasks/{task_id}                    task with input artifacts
/// /tasks/{task_id}/approve            approve (POST)
/// /tasks/{task_id}/reject             reject (POST)
///
/// /creatives                          catalog
/// /creatives/{id}                     one creative
/// /creatives/import                   CSV import (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/runs", runs::router())
        .nest("/tasks", tasks::router())
        .nest("/creatives", creatives::router())
}
