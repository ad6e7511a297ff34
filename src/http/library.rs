//! Library listing and scan-trigger handlers (spec §6 `/api/library/*`).

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::state::AppState;
use crate::error::Result;
use crate::store::models::MediaRow;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PageQuery {
    fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<MediaRow>>> {
    let rows = state
        .store
        .list_movies(page.clamped_limit(), page.offset)
        .await?;
    Ok(Json(rows))
}

pub async fn list_shows(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<crate::store::models::ShowRow>>> {
    let rows = state
        .store
        .list_shows(page.clamped_limit(), page.offset)
        .await?;
    Ok(Json(rows))
}

pub async fn list_recent(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<MediaRow>>> {
    let rows = state
        .store
        .list_recent(page.clamped_limit(), page.offset)
        .await?;
    Ok(Json(rows))
}

/// Triggers a full scan; 409 if one is already running (spec §4.5, §6).
pub async fn trigger_scan(
    State(state): State<AppState>,
) -> Result<Json<crate::scan::ScanSummary>> {
    let summary = state.scan.run_full_scan().await?;
    Ok(Json(summary))
}

#[derive(Debug, serde::Serialize)]
pub struct PruneCandidate {
    pub kind: &'static str,
    pub id: i64,
    pub file_path: String,
}

/// Read-only "what would a prune remove" preview (supplemented per
/// SPEC_FULL §2: the spec leaves delete-on-missing-file semantics an open
/// question, so this endpoint only reports, never deletes).
pub async fn prune_preview(
    State(state): State<AppState>,
) -> Result<Json<Vec<PruneCandidate>>> {
    let mut missing = Vec::new();
    for row in state.store.list_movies(i64::MAX, 0).await? {
        if tokio::fs::metadata(&row.file_path).await.is_err() {
            missing.push(PruneCandidate {
                kind: "movie",
                id: row.id,
                file_path: row.file_path,
            });
        }
    }
    Ok(Json(missing))
}
