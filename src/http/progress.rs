//! Watch-progress and continue-watching handlers (spec §4.11, §6).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::auth::CurrentUser;
use super::state::AppState;
use crate::error::Result;
use crate::ids::MediaKind;
use crate::store::models::WatchProgressRow;

#[derive(Debug, Deserialize)]
pub struct MediaKindQuery {
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

pub async fn get_progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(media_id): Path<i64>,
    Query(q): Query<MediaKindQuery>,
) -> Result<Json<Option<WatchProgressRow>>> {
    let row = state
        .store
        .get_progress(user_id, q.kind, media_id)
        .await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub position_seconds: f64,
    pub duration_seconds: f64,
}

pub async fn update_progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(media_id): Path<i64>,
    Json(body): Json<ProgressUpdate>,
) -> Result<Json<WatchProgressRow>> {
    let row = state
        .store
        .upsert_progress(
            user_id,
            body.kind,
            media_id,
            body.position_seconds,
            body.duration_seconds,
        )
        .await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct ContinueWatchingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

pub async fn continue_watching(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<ContinueWatchingQuery>,
) -> Result<Json<Vec<WatchProgressRow>>> {
    let rows = state
        .store
        .continue_watching(user_id, q.limit.clamp(1, 100))
        .await?;
    Ok(Json(rows))
}
