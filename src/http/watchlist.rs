//! Watchlist CRUD handlers (spec §4.11, §6).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::auth::CurrentUser;
use super::state::AppState;
use crate::error::Result;
use crate::ids::MediaKind;
use crate::store::models::WatchlistRow;

#[derive(Debug, Deserialize)]
pub struct WatchlistItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub media_id: i64,
}

pub async fn list_watchlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<WatchlistRow>>> {
    Ok(Json(state.store.list_watchlist(user_id).await?))
}

pub async fn add_watchlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<WatchlistItem>,
) -> Result<StatusCode> {
    state
        .store
        .add_watchlist(user_id, body.kind, body.media_id)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_watchlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<WatchlistItem>,
) -> Result<StatusCode> {
    state
        .store
        .remove_watchlist(user_id, q.kind, q.media_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MarkWatched {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub media_id: i64,
    pub duration_seconds: f64,
}

pub async fn mark_watched(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<MarkWatched>,
) -> Result<StatusCode> {
    state
        .store
        .mark_watched(user_id, body.kind, body.media_id, body.duration_seconds)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
