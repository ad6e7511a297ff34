//! Playlist CRUD + item CRUD + reorder handlers (spec §4.11, §6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::auth::{require_owner, CurrentUser};
use super::state::AppState;
use crate::error::Result;
use crate::ids::MediaKind;
use crate::store::models::{PlaylistItemRow, PlaylistRow};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_playlists(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<PlaylistRow>>> {
    Ok(Json(state.store.list_playlists(user_id).await?))
}

pub async fn create_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreatePlaylist>,
) -> Result<Json<PlaylistRow>> {
    let id = state
        .store
        .create_playlist(user_id, &body.name, body.description.as_deref())
        .await?;
    Ok(Json(state.store.get_playlist(id).await?))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlaylistRow>> {
    Ok(Json(state.store.get_playlist(id.into()).await?))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let playlist = state.store.get_playlist(id.into()).await?;
    require_owner(CurrentUser(user_id), playlist.owner_user_id)?;
    state.store.delete_playlist(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PlaylistItemRow>>> {
    Ok(Json(state.store.list_playlist_items(id.into()).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub media_id: i64,
}

pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<AddItem>,
) -> Result<StatusCode> {
    let playlist = state.store.get_playlist(id.into()).await?;
    require_owner(CurrentUser(user_id), playlist.owner_user_id)?;
    state
        .store
        .add_playlist_item(id.into(), body.kind, body.media_id)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((id, position)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    let playlist = state.store.get_playlist(id.into()).await?;
    require_owner(CurrentUser(user_id), playlist.owner_user_id)?;
    state.store.remove_playlist_item(id.into(), position).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub item_ids: Vec<ReorderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub media_id: i64,
}

pub async fn reorder(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ReorderRequest>,
) -> Result<StatusCode> {
    let playlist = state.store.get_playlist(id.into()).await?;
    require_owner(CurrentUser(user_id), playlist.owner_user_id)?;
    let ordered: Vec<(MediaKind, i64)> = body
        .item_ids
        .into_iter()
        .map(|e| (e.kind, e.media_id))
        .collect();
    state.store.reorder_playlist(id.into(), &ordered).await?;
    Ok(StatusCode::NO_CONTENT)
}
