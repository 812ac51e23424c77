use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /pending                 -> list_pending
/// GET    /{task_id}               -> get_task
/// POST   /{task_id}/approve       -> approve_task
/// POST   /{task_id}/reject        -> reject_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(tasks::list_pending))
        .route("/{task_id}", get(tasks::get_task))
        .route("/{task_id}/approve", post(tasks::approve_task))
        .route("/{task_id}/reject", post(tasks::reject_task))
}
