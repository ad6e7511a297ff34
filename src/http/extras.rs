//! Standalone extras handlers (spec §6 `/api/extras[...]`).

use axum::extract::{Path, State};
use axum::Json;

use super::state::AppState;
use crate::error::Result;
use crate::store::models::ExtraRow;

pub async fn list_extras(State(state): State<AppState>) -> Result<Json<Vec<ExtraRow>>> {
    Ok(Json(state.store.list_extras(200, 0).await?))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.store.list_extra_categories().await?))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ExtraRow>>> {
    Ok(Json(state.store.list_extras_by_category(&category).await?))
}

pub async fn get_extra(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ExtraRow>> {
    Ok(Json(state.store.get_extra(id.into()).await?))
}
