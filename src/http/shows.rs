//! Hierarchical TV navigation handlers (spec §6 `/api/shows/:id[...]`).

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::state::AppState;
use crate::error::Result;
use crate::store::models::{EpisodeRow, SeasonRow, ShowRow};

pub async fn get_show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ShowRow>> {
    Ok(Json(state.store.get_show(id.into()).await?))
}

pub async fn list_seasons(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SeasonRow>>> {
    Ok(Json(state.store.list_seasons(id.into()).await?))
}

pub async fn get_season(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, i32)>,
) -> Result<Json<Vec<EpisodeRow>>> {
    Ok(Json(state.store.list_episodes(id.into(), Some(n)).await?))
}

pub async fn list_season_episodes(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, i32)>,
) -> Result<Json<Vec<EpisodeRow>>> {
    Ok(Json(state.store.list_episodes(id.into(), Some(n)).await?))
}

pub async fn list_episodes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<EpisodeRow>>> {
    Ok(Json(state.store.list_episodes(id.into(), None).await?))
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub season: Option<i32>,
}

pub async fn random_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    axum::extract::Query(q): axum::extract::Query<RandomQuery>,
) -> Result<Json<EpisodeRow>> {
    Ok(Json(state.store.random_episode(id.into(), q.season).await?))
}

pub async fn random_episode_in_season(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, i32)>,
) -> Result<Json<EpisodeRow>> {
    Ok(Json(state.store.random_episode(id.into(), Some(n)).await?))
}
