//! Movie-shaped `MediaItem` repository (spec §3, §4.4).

use sqlx::Row;

use super::models::MediaRow;
use super::{now_rfc3339, Store};
use crate::error::{AppError, Result};
use crate::ids::MediaId;

/// Everything the ingest pipeline knows about a movie before it has a row.
#[derive(Debug, Clone, Default)]
pub struct MovieUpsert {
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<i32>,
    pub genres: Vec<String>,
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
    pub root_id: Option<i64>,
    pub file_path: String,
    pub file_size: i64,
    pub duration_seconds: i64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub audio_tracks_json: String,
    pub subtitle_tracks_json: String,
}

impl Store {
    /// Upsert keyed by file path (spec §4.4 "Upsert MediaItem / Episode by
    /// file-path").
    pub async fn upsert_movie(&self, m: &MovieUpsert) -> Result<MediaId> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        let genres = m.genres.join(", ");
        let row = sqlx::query(
            r#"INSERT INTO media (
                kind, title, original_title, year, overview, poster_ref, backdrop_ref,
                rating, runtime_minutes, genres, tmdb_id, imdb_id, root_id, file_path,
                file_size, duration_seconds, video_codec, audio_codec, resolution,
                audio_tracks, subtitle_tracks, created_at, updated_at
            ) VALUES ('movie', ?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)
            ON CONFLICT(file_path) DO UPDATE SET
                title = excluded.title,
                original_title = excluded.original_title,
                year = COALESCE(excluded.year, media.year),
                overview = COALESCE(excluded.overview, media.overview),
                poster_ref = COALESCE(excluded.poster_ref, media.poster_ref),
                backdrop_ref = COALESCE(excluded.backdrop_ref, media.backdrop_ref),
                rating = COALESCE(excluded.rating, media.rating),
                runtime_minutes = COALESCE(excluded.runtime_minutes, media.runtime_minutes),
                genres = CASE WHEN excluded.genres = '' THEN media.genres ELSE excluded.genres END,
                tmdb_id = COALESCE(excluded.tmdb_id, media.tmdb_id),
                imdb_id = COALESCE(excluded.imdb_id, media.imdb_id),
                file_size = excluded.file_size,
                duration_seconds = excluded.duration_seconds,
                video_codec = excluded.video_codec,
                audio_codec = excluded.audio_codec,
                resolution = excluded.resolution,
                audio_tracks = excluded.audio_tracks,
                subtitle_tracks = excluded.subtitle_tracks,
                updated_at = excluded.updated_at
            RETURNING id"#,
        )
        .bind(&m.title)
        .bind(&m.original_title)
        .bind(m.year)
        .bind(&m.overview)
        .bind(&m.poster_ref)
        .bind(&m.backdrop_ref)
        .bind(m.rating)
        .bind(m.runtime_minutes)
        .bind(genres)
        .bind(&m.tmdb_id)
        .bind(&m.imdb_id)
        .bind(m.root_id)
        .bind(&m.file_path)
        .bind(m.file_size)
        .bind(m.duration_seconds)
        .bind(&m.video_codec)
        .bind(&m.audio_codec)
        .bind(&m.resolution)
        .bind(&m.audio_tracks_json)
        .bind(&m.subtitle_tracks_json)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(MediaId(row.get::<i64, _>("id")))
    }

    pub async fn get_movie(&self, id: MediaId) -> Result<MediaRow> {
        sqlx::query_as::<_, MediaRow>("SELECT * FROM media WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "movie" })
    }

    /// Exact case-insensitive title lookup, used by the extras linker
    /// before it falls back to fuzzy matching (spec §4.6 step 1).
    pub async fn find_movie_by_title(&self, title: &str) -> Result<Option<MediaRow>> {
        Ok(
            sqlx::query_as::<_, MediaRow>("SELECT * FROM media WHERE title = ? COLLATE NOCASE")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_movie_by_path(&self, path: &str) -> Result<Option<MediaRow>> {
        Ok(
            sqlx::query_as::<_, MediaRow>("SELECT * FROM media WHERE file_path = ?")
                .bind(path)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_movies(&self, limit: i64, offset: i64) -> Result<Vec<MediaRow>> {
        Ok(sqlx::query_as::<_, MediaRow>(
            "SELECT * FROM media ORDER BY title ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<MediaRow>> {
        Ok(sqlx::query_as::<_, MediaRow>(
            "SELECT * FROM media ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Bidirectional-containment fuzzy title search used by the extras
    /// linker (spec §4.4): ordered so the most specific (longest) title
    /// wins ties.
    pub async fn fuzzy_search_movies(&self, needle: &str) -> Result<Vec<MediaRow>> {
        let pattern = format!("%{needle}%");
        Ok(sqlx::query_as::<_, MediaRow>(
            r#"SELECT * FROM media
               WHERE title LIKE ?1 OR ?2 LIKE '%' || title || '%'
               ORDER BY LENGTH(title) DESC"#,
        )
        .bind(&pattern)
        .bind(needle)
        .fetch_all(&self.pool)
        .await?)
    }
}
