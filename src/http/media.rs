//! Single-item detail handler (spec §6 `GET /api/media/:id`).

use axum::extract::{Path, State};
use axum::Json;

use super::state::AppState;
use crate::error::Result;
use crate::store::models::MediaRow;

pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MediaRow>> {
    let row = state.store.get_movie(id.into()).await?;
    Ok(Json(row))
}
