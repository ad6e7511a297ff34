//! Stream Router handlers (C9, spec §4.9, §6 `/api/stream/:id/*`).

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::state::AppState;
use crate::error::{AppError, Result};
use crate::ids::MediaKind;
use crate::stream as router;

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: MediaKind,
}

fn default_kind() -> MediaKind {
    MediaKind::Movie
}

pub async fn manifest(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<KindQuery>,
) -> Result<Response> {
    let outcome = router::prepare_manifest(
        &state.store,
        &state.hls,
        q.kind,
        id,
        state.config.hls.initial_segments as u32,
    )
    .await?;

    let body = match outcome {
        router::ManifestOutcome::Direct(m) => m,
        router::ManifestOutcome::Transcoded(m) => m,
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

pub async fn segment(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, u32)>,
) -> Result<Response> {
    state.hls.wait_for_segment(id, n).await?;
    let session = state
        .hls
        .session(id)
        .ok_or(AppError::NotFound { kind: "session" })?;
    let bytes = tokio::fs::read(session.segment_path(n)).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/mp2t"),
            (header::CACHE_CONTROL, "max-age=31536000, immutable"),
        ],
        bytes,
    )
        .into_response())
}

pub async fn subtitles(
    State(state): State<AppState>,
    Path((id, lang)): Path<(i64, String)>,
) -> Result<Response> {
    let session = state
        .hls
        .session(id)
        .ok_or(AppError::NotFound { kind: "session" })?;
    let path = session.output_dir.join(format!("subtitle_{lang}.vtt"));
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| AppError::NotFound { kind: "subtitle" })?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/vtt")], body).into_response())
}

pub async fn stop_transcode(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.hls.stop_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn direct(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<KindQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let media = router::resolve_media(&state.store, q.kind, id).await?;
    if !media.path.exists() {
        return Err(AppError::not_found("media file"));
    }

    let (status, bytes, content_range) = read_range(&media.path, headers.get(header::RANGE)).await?;

    let mut response = (
        status,
        [
            (header::ACCEPT_RANGES, "bytes".to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        Body::from(bytes),
    )
        .into_response();

    if let Some(range) = content_range {
        response
            .headers_mut()
            .insert(header::CONTENT_RANGE, range.parse().unwrap());
    }
    Ok(response)
}

/// Serves the whole file, or a single byte range if `Range: bytes=a-b` is
/// present (spec §4.9 "respond with `Accept-Ranges: bytes`").
async fn read_range(
    path: &PathBuf,
    range_header: Option<&axum::http::HeaderValue>,
) -> Result<(StatusCode, Vec<u8>, Option<String>)> {
    let mut file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await?.len();

    let Some(range) = range_header.and_then(|v| v.to_str().ok()).and_then(parse_range) else {
        let mut buf = Vec::with_capacity(total as usize);
        file.read_to_end(&mut buf).await?;
        return Ok((StatusCode::OK, buf, None));
    };

    let (start, end) = range;
    let end = end.unwrap_or(total.saturating_sub(1)).min(total.saturating_sub(1));
    if start > end || start >= total {
        return Err(AppError::validation("range", "unsatisfiable range"));
    }

    let len = (end - start + 1) as usize;
    file.seek(std::io::SeekFrom::Start(start)).await?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf).await?;

    Ok((
        StatusCode::PARTIAL_CONTENT,
        buf,
        Some(format!("bytes {start}-{end}/{total}")),
    ))
}

fn parse_range(header: &str) -> Option<(u64, Option<u64>)> {
    let spec = header.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse().ok()?)
    };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_handles_open_ended() {
        assert_eq!(parse_range("bytes=100-"), Some((100, None)));
        assert_eq!(parse_range("bytes=0-499"), Some((0, Some(499))));
        assert_eq!(parse_range("garbage"), None);
    }
}
