//! Channel CRUD, sources, regenerate, now-playing, and schedule handlers
//! (spec §4.10, §6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::auth::{require_owner, CurrentUser};
use super::state::AppState;
use crate::channel;
use crate::chrono_now::now_unix;
use crate::error::Result;
use crate::store::channels::ChannelSourceUpsert;
use crate::store::models::{ChannelRow, ChannelSourceRow, ScheduleEntryRow};

#[derive(Debug, Deserialize)]
pub struct CreateChannel {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

pub async fn list_channels(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ChannelRow>>> {
    Ok(Json(state.store.list_channels(user_id).await?))
}

pub async fn create_channel(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreateChannel>,
) -> Result<Json<ChannelRow>> {
    let id = state
        .store
        .create_channel(user_id, &body.name, body.description.as_deref(), body.icon.as_deref())
        .await?;
    Ok(Json(state.store.get_channel(id).await?))
}

pub async fn get_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ChannelRow>> {
    Ok(Json(state.store.get_channel(id.into()).await?))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let channel = state.store.get_channel(id.into()).await?;
    require_owner(CurrentUser(user_id), channel.owner_user_id)?;
    state.store.delete_channel(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_source(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ChannelSourceUpsert>,
) -> Result<StatusCode> {
    let channel = state.store.get_channel(id.into()).await?;
    require_owner(CurrentUser(user_id), channel.owner_user_id)?;
    state.store.add_channel_source(id.into(), &body).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_source(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((id, source_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    let channel = state.store.get_channel(id.into()).await?;
    require_owner(CurrentUser(user_id), channel.owner_user_id)?;
    state.store.remove_channel_source(id.into(), source_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sources(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ChannelSourceRow>>> {
    Ok(Json(state.store.list_channel_sources(id.into()).await?))
}

pub async fn regenerate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let channel = state.store.get_channel(id.into()).await?;
    require_owner(CurrentUser(user_id), channel.owner_user_id)?;
    channel::regenerate(&state.store, id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ScheduleEntryRow>>> {
    Ok(Json(state.store.list_schedule_cycle(id.into()).await?))
}

#[derive(Debug, Serialize)]
pub struct NowPlayingResponse {
    pub entry: ScheduleEntryRow,
    pub elapsed_within_item_seconds: i64,
    pub stream_url: String,
    pub up_next: Vec<ScheduleEntryRow>,
}

/// Pure function of the stored schedule and current wall-clock time (spec
/// §4.10, properties P7/P8) — no per-client state, safe to compute on any
/// node.
pub async fn now_playing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NowPlayingResponse>> {
    let channel_id: crate::ids::ChannelId = id.into();
    let ch = state.store.get_channel(channel_id).await?;
    let entries = state.store.list_schedule_cycle(channel_id).await?;

    let now = now_unix();
    let created_at = crate::chrono_now::parse_rfc3339_unix(&ch.created_at).unwrap_or(now);
    let offset = now - created_at;

    let (entry, elapsed) = channel::now_playing(&entries, offset)
        .ok_or(crate::error::AppError::NotFound { kind: "schedule" })?;
    let next = channel::up_next(&entries, entry, 5)
        .into_iter()
        .cloned()
        .collect();

    let stream_url = format!(
        "/api/stream/{}/manifest.m3u8?type={}&start={}",
        entry.media_id, entry.media_kind, elapsed
    );

    Ok(Json(NowPlayingResponse {
        entry: entry.clone(),
        elapsed_within_item_seconds: elapsed,
        stream_url,
        up_next: next,
    }))
}
