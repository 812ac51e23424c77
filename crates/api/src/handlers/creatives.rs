//! Handlers for the creative catalog.

use adapt_core::creative::parse_creatives_csv;
use adapt_core::error::CoreError;
use adapt_core::types::DbId;
use adapt_db::models::creative::Creative;
use adapt_db::repositories::CreativeRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct CreativeListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub creatives: Vec<Creative>,
}

/// GET /api/v1/creatives?limit=&offset=
pub async fn list_creatives(
    State(state): State<AppState>,
    Query(params): Query<CreativeListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let creatives = CreativeRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: creatives }))
}

/// GET /api/v1/creatives/{id}
pub async fn get_creative(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let creative = CreativeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "creative",
            id,
        }))?;
    Ok(Json(DataResponse { data: creative }))
}

/// POST /api/v1/creatives/import
///
/// Body is the catalog CSV export. Re-importing a row with the same title
/// and image updates its landing page. Returns 201.
pub async fn import_creatives(
    State(state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let records = parse_creatives_csv(body.as_bytes())?;
    if records.is_empty() {
        return Err(AppError::BadRequest(
            "CSV contains no creatives with a title".into(),
        ));
    }

    let creatives = CreativeRepo::insert_many(&state.pool, &records).await?;
    tracing::info!(count = creatives.len(), "Creative catalog imported");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportSummary {
                imported: creatives.len(),
                creatives,
            },
        }),
    ))
}
