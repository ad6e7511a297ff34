//! Storage root CRUD handlers (spec §6 `/api/sources`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::state::AppState;
use crate::error::Result;
use crate::store::models::StorageRootRow;
use crate::store::sources::StorageRootUpsert;

pub async fn list_sources(State(state): State<AppState>) -> Result<Json<Vec<StorageRootRow>>> {
    Ok(Json(state.store.list_storage_roots().await?))
}

pub async fn create_source(
    State(state): State<AppState>,
    Json(body): Json<StorageRootUpsert>,
) -> Result<Json<StorageRootRow>> {
    let id = state.store.create_storage_root(&body).await?;
    Ok(Json(state.store.get_storage_root(id).await?))
}

pub async fn delete_source(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_storage_root(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
