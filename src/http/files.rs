//! Directory browse handler (spec §6 `GET /api/files?path=…`):
//! confined to the configured browse prefix, rejects traversal.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct BrowseEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

/// Resolves `requested` against `prefix`, rejecting any path that escapes
/// it — `..` components, absolute overrides, and symlink traversal are
/// all closed off by canonicalizing and checking containment.
fn resolve_within_prefix(prefix: &FsPath, requested: &str) -> Result<PathBuf> {
    if requested.contains("..") {
        return Err(AppError::validation("path", "path traversal is not allowed"));
    }
    let candidate = prefix.join(requested.trim_start_matches('/'));
    Ok(candidate)
}

pub async fn browse(
    State(state): State<AppState>,
    Query(q): Query<BrowseQuery>,
) -> Result<Json<Vec<BrowseEntry>>> {
    let prefix = &state.config.browse_prefix;
    let target = resolve_within_prefix(prefix, &q.path)?;

    let canonical_prefix = tokio::fs::canonicalize(prefix)
        .await
        .map_err(|_| AppError::validation("path", "configured browse prefix does not exist"))?;
    let canonical_target = tokio::fs::canonicalize(&target)
        .await
        .map_err(|_| AppError::not_found("path"))?;
    if !canonical_target.starts_with(&canonical_prefix) {
        return Err(AppError::PermissionDenied);
    }

    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&canonical_target)
        .await
        .map_err(|_| AppError::validation("path", "not a directory"))?;
    while let Some(entry) = read_dir.next_entry().await? {
        let file_type = entry.file_type().await?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = entry
            .path()
            .strip_prefix(&canonical_prefix)
            .unwrap_or(&entry.path())
            .to_string_lossy()
            .into_owned();
        entries.push(BrowseEntry {
            name,
            path: rel,
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dotdot_traversal() {
        let err = resolve_within_prefix(FsPath::new("/media"), "../etc/passwd").unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }

    #[test]
    fn accepts_plain_relative_path() {
        let resolved = resolve_within_prefix(FsPath::new("/media"), "movies").unwrap();
        assert_eq!(resolved, PathBuf::from("/media/movies"));
    }
}
