use axum::routing::{get, post};
use axum::Router;

use crate::handlers::creatives;
use crate::state::AppState;

/// Routes mounted at `/creatives`.
///
/// ```text
/// GET    /            -> list_creatives
/// POST   /import      -> import_creatives
/// GET    /{id}        -> get_creative
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(creatives::list_creatives))
        .route("/import", post(creatives::import_creatives))
        .route("/{id}", get(creatives::get_creative))
}
