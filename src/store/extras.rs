//! Extras repository (spec §3, §4.6).

use sqlx::Row;

use super::models::ExtraRow;
use super::{now_rfc3339, Store};
use crate::error::{AppError, Result};
use crate::ids::ExtraId;

#[derive(Debug, Clone, Default)]
pub struct ExtraUpsert {
    pub title: String,
    pub category: String,
    pub movie_id: Option<i64>,
    pub tv_show_id: Option<i64>,
    pub episode_id: Option<i64>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
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
    pub async fn upsert_extra(&self, e: &ExtraUpsert) -> Result<ExtraId> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        let row = sqlx::query(
            r#"INSERT INTO extras (
                title, category, movie_id, tv_show_id, episode_id, season_number,
                episode_number, file_path, file_size, duration_seconds, video_codec,
                audio_codec, resolution, audio_tracks, subtitle_tracks, created_at, updated_at
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)
            ON CONFLICT(file_path) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                movie_id = excluded.movie_id,
                tv_show_id = excluded.tv_show_id,
                episode_id = excluded.episode_id,
                season_number = excluded.season_number,
                episode_number = excluded.episode_number,
                file_size = excluded.file_size,
                duration_seconds = excluded.duration_seconds,
                updated_at = excluded.updated_at
            RETURNING id"#,
        )
        .bind(&e.title)
        .bind(&e.category)
        .bind(e.movie_id)
        .bind(e.tv_show_id)
        .bind(e.episode_id)
        .bind(e.season_number)
        .bind(e.episode_number)
        .bind(&e.file_path)
        .bind(e.file_size)
        .bind(e.duration_seconds)
        .bind(&e.video_codec)
        .bind(&e.audio_codec)
        .bind(&e.resolution)
        .bind(&e.audio_tracks_json)
        .bind(&e.subtitle_tracks_json)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(ExtraId(row.get::<i64, _>("id")))
    }

    pub async fn get_extra(&self, id: ExtraId) -> Result<ExtraRow> {
        sqlx::query_as::<_, ExtraRow>("SELECT * FROM extras WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "extra" })
    }

    pub async fn list_extras(&self, limit: i64, offset: i64) -> Result<Vec<ExtraRow>> {
        Ok(sqlx::query_as::<_, ExtraRow>(
            "SELECT * FROM extras ORDER BY title ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_extra_categories(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT category FROM extras ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }

    pub async fn list_extras_by_category(&self, category: &str) -> Result<Vec<ExtraRow>> {
        Ok(sqlx::query_as::<_, ExtraRow>(
            "SELECT * FROM extras WHERE category = ? ORDER BY title ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?)
    }
}
