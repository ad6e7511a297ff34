//! Section CRUD, rules, manual membership, and reorder handlers (spec
//! §4.7, §6).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::library::PageQuery;
use super::state::AppState;
use crate::error::Result;
use crate::ids::MediaKind;
use crate::rules::Rule;
use crate::store::models::{MediaRow, SectionRow};
use crate::store::sections::SectionUpsert;

pub async fn list_sections(State(state): State<AppState>) -> Result<Json<Vec<SectionRow>>> {
    Ok(Json(state.store.list_sections().await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    Json(body): Json<SectionUpsert>,
) -> Result<Json<SectionRow>> {
    let id = state.store.create_section(&body).await?;
    Ok(Json(state.store.get_section(id).await?))
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SectionRow>> {
    Ok(Json(state.store.get_section(id.into()).await?))
}

pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SectionUpsert>,
) -> Result<Json<SectionRow>> {
    state.store.update_section(id.into(), &body).await?;
    Ok(Json(state.store.get_section(id.into()).await?))
}

pub async fn delete_section(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_section(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_section_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<MediaRow>>> {
    let rows = state
        .store
        .list_section_media(id.into(), page.limit.clamp(1, 100), page.offset)
        .await?;
    Ok(Json(rows))
}

pub async fn set_rules(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(rules): Json<Vec<Rule>>,
) -> Result<StatusCode> {
    state.store.set_rules(id.into(), &rules).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_rules(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Rule>>> {
    Ok(Json(state.store.list_rules(id.into()).await?))
}

#[derive(Debug, Deserialize)]
pub struct MemberRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub media_id: i64,
}

pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<MemberRef>,
) -> Result<StatusCode> {
    state
        .store
        .add_manual_member(id.into(), body.kind, body.media_id)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MemberRef>,
) -> Result<StatusCode> {
    state
        .store
        .remove_manual_member(id.into(), q.kind, q.media_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReorderSections {
    pub section_ids: Vec<i64>,
}

pub async fn reorder_sections(
    State(state): State<AppState>,
    Json(body): Json<ReorderSections>,
) -> Result<StatusCode> {
    let ids: Vec<crate::ids::SectionId> = body.section_ids.into_iter().map(Into::into).collect();
    state.store.reorder_sections(&ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
