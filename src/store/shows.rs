//! Show / Season / Episode repository (spec §3, §4.4, §4.5 TV branch).

use sqlx::Row;

use super::models::{EpisodeRow, SeasonRow, ShowRow};
use super::{now_rfc3339, Store};
use crate::error::{AppError, Result};
use crate::ids::{EpisodeId, SeasonId, ShowId};

#[derive(Debug, Clone, Default)]
pub struct ShowUpsert {
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodeUpsert {
    pub show_id: i64,
    pub season_id: i64,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub airdate: Option<String>,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<i32>,
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
    /// Look up by external id preferred, else case-insensitive title
    /// (spec §4.5 "look up or create Show").
    pub async fn find_show(&self, title: &str, tmdb_id: Option<&str>) -> Result<Option<ShowRow>> {
        if let Some(tmdb) = tmdb_id {
            if let Some(row) = sqlx::query_as::<_, ShowRow>("SELECT * FROM shows WHERE tmdb_id = ?")
                .bind(tmdb)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(Some(row));
            }
        }
        Ok(
            sqlx::query_as::<_, ShowRow>("SELECT * FROM shows WHERE title = ? COLLATE NOCASE")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get_or_create_show(&self, new: &ShowUpsert) -> Result<ShowId> {
        let _guard = self.write_guard().await;
        if let Some(existing) = self.find_show(&new.title, new.tmdb_id.as_deref()).await? {
            return Ok(ShowId(existing.id));
        }
        let now = now_rfc3339();
        let genres = new.genres.join(", ");
        let row = sqlx::query(
            r#"INSERT INTO shows (title, year, overview, poster_ref, backdrop_ref, rating,
                genres, tmdb_id, imdb_id, created_at, updated_at)
               VALUES (?,?,?,?,?,?,?,?,?,?,?)
               ON CONFLICT(title, year) DO UPDATE SET updated_at = excluded.updated_at
               RETURNING id"#,
        )
        .bind(&new.title)
        .bind(new.year)
        .bind(&new.overview)
        .bind(&new.poster_ref)
        .bind(&new.backdrop_ref)
        .bind(new.rating)
        .bind(genres)
        .bind(&new.tmdb_id)
        .bind(&new.imdb_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(ShowId(row.get::<i64, _>("id")))
    }

    pub async fn get_or_create_season(&self, show_id: ShowId, season_number: i32) -> Result<SeasonId> {
        let _guard = self.write_guard().await;
        if let Some(row) = sqlx::query_as::<_, SeasonRow>(
            "SELECT * FROM seasons WHERE show_id = ? AND season_number = ?",
        )
        .bind(show_id.get())
        .bind(season_number)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(SeasonId(row.id));
        }
        let row = sqlx::query(
            r#"INSERT INTO seasons (show_id, season_number) VALUES (?, ?)
               ON CONFLICT(show_id, season_number) DO UPDATE SET season_number = excluded.season_number
               RETURNING id"#,
        )
        .bind(show_id.get())
        .bind(season_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(SeasonId(row.get::<i64, _>("id")))
    }

    pub async fn upsert_episode(&self, e: &EpisodeUpsert) -> Result<EpisodeId> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        let row = sqlx::query(
            r#"INSERT INTO episodes (
                show_id, season_id, season_number, episode_number, title, overview, airdate,
                rating, runtime_minutes, root_id, file_path, file_size, duration_seconds,
                video_codec, audio_codec, resolution, audio_tracks, subtitle_tracks,
                created_at, updated_at
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)
            ON CONFLICT(file_path) DO UPDATE SET
                title = COALESCE(excluded.title, episodes.title),
                overview = COALESCE(excluded.overview, episodes.overview),
                airdate = COALESCE(excluded.airdate, episodes.airdate),
                rating = COALESCE(excluded.rating, episodes.rating),
                runtime_minutes = COALESCE(excluded.runtime_minutes, episodes.runtime_minutes),
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
        .bind(e.show_id)
        .bind(e.season_id)
        .bind(e.season_number)
        .bind(e.episode_number)
        .bind(&e.title)
        .bind(&e.overview)
        .bind(&e.airdate)
        .bind(e.rating)
        .bind(e.runtime_minutes)
        .bind(e.root_id)
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

        // Keep cached counts fresh; cheap enough at ingest cadence.
        sqlx::query(
            "UPDATE seasons SET episode_count = (SELECT COUNT(*) FROM episodes WHERE season_id = ?1) WHERE id = ?1",
        )
        .bind(e.season_id)
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"UPDATE shows SET
                season_count = (SELECT COUNT(*) FROM seasons WHERE show_id = ?1),
                episode_count = (SELECT COUNT(*) FROM episodes WHERE show_id = ?1)
               WHERE id = ?1"#,
        )
        .bind(e.show_id)
        .execute(&self.pool)
        .await?;

        Ok(EpisodeId(row.get::<i64, _>("id")))
    }

    pub async fn find_episode_by_path(&self, path: &str) -> Result<Option<EpisodeRow>> {
        Ok(
            sqlx::query_as::<_, EpisodeRow>("SELECT * FROM episodes WHERE file_path = ?")
                .bind(path)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get_show(&self, id: ShowId) -> Result<ShowRow> {
        sqlx::query_as::<_, ShowRow>("SELECT * FROM shows WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "show" })
    }

    pub async fn list_shows(&self, limit: i64, offset: i64) -> Result<Vec<ShowRow>> {
        Ok(sqlx::query_as::<_, ShowRow>(
            "SELECT * FROM shows ORDER BY title ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_seasons(&self, show_id: ShowId) -> Result<Vec<SeasonRow>> {
        Ok(sqlx::query_as::<_, SeasonRow>(
            "SELECT * FROM seasons WHERE show_id = ? ORDER BY season_number ASC",
        )
        .bind(show_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_episodes(
        &self,
        show_id: ShowId,
        season_number: Option<i32>,
    ) -> Result<Vec<EpisodeRow>> {
        match season_number {
            Some(n) => Ok(sqlx::query_as::<_, EpisodeRow>(
                "SELECT * FROM episodes WHERE show_id = ? AND season_number = ? ORDER BY episode_number ASC",
            )
            .bind(show_id.get())
            .bind(n)
            .fetch_all(&self.pool)
            .await?),
            None => Ok(sqlx::query_as::<_, EpisodeRow>(
                "SELECT * FROM episodes WHERE show_id = ? ORDER BY season_number ASC, episode_number ASC",
            )
            .bind(show_id.get())
            .fetch_all(&self.pool)
            .await?),
        }
    }

    pub async fn random_episode(
        &self,
        show_id: ShowId,
        season_number: Option<i32>,
    ) -> Result<EpisodeRow> {
        let row = match season_number {
            Some(n) => sqlx::query_as::<_, EpisodeRow>(
                "SELECT * FROM episodes WHERE show_id = ? AND season_number = ? ORDER BY RANDOM() LIMIT 1",
            )
            .bind(show_id.get())
            .bind(n)
            .fetch_optional(&self.pool)
            .await?,
            None => sqlx::query_as::<_, EpisodeRow>(
                "SELECT * FROM episodes WHERE show_id = ? ORDER BY RANDOM() LIMIT 1",
            )
            .bind(show_id.get())
            .fetch_optional(&self.pool)
            .await?,
        };
        row.ok_or(AppError::NotFound { kind: "episode" })
    }

    pub async fn find_episode(
        &self,
        show_id: ShowId,
        season_number: i32,
        episode_number: i32,
    ) -> Result<Option<EpisodeRow>> {
        Ok(sqlx::query_as::<_, EpisodeRow>(
            "SELECT * FROM episodes WHERE show_id = ? AND season_number = ? AND episode_number = ?",
        )
        .bind(show_id.get())
        .bind(season_number)
        .bind(episode_number)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn get_episode(&self, id: EpisodeId) -> Result<EpisodeRow> {
        sqlx::query_as::<_, EpisodeRow>("SELECT * FROM episodes WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "episode" })
    }

    /// Same bidirectional-containment fuzzy match as `fuzzy_search_movies`,
    /// used by the extras linker when the parent-directory context is TV
    /// (spec §4.6).
    pub async fn fuzzy_search_shows(&self, needle: &str) -> Result<Vec<ShowRow>> {
        let pattern = format!("%{needle}%");
        Ok(sqlx::query_as::<_, ShowRow>(
            r#"SELECT * FROM shows
               WHERE title LIKE ?1 OR ?2 LIKE '%' || title || '%'
               ORDER BY LENGTH(title) DESC"#,
        )
        .bind(&pattern)
        .bind(needle)
        .fetch_all(&self.pool)
        .await?)
    }
}
