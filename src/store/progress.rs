//! WatchProgress repository (spec §3, §4.11, property P4).

use super::models::WatchProgressRow;
use super::{now_rfc3339, Store};
use crate::error::Result;
use crate::ids::MediaKind;

impl Store {
    /// Conflict-updates in place; completion auto-sets when
    /// `position / duration > 0.95` regardless of the caller's flag
    /// (spec §4.11, property P4).
    pub async fn upsert_progress(
        &self,
        user_id: i64,
        kind: MediaKind,
        media_id: i64,
        position_seconds: f64,
        duration_seconds: f64,
    ) -> Result<WatchProgressRow> {
        let _guard = self.write_guard().await;
        let completed = duration_seconds > 0.0 && position_seconds / duration_seconds > 0.95;
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO watch_progress (user_id, media_kind, media_id, position_seconds, duration_seconds, completed, updated_at)
               VALUES (?,?,?,?,?,?,?)
               ON CONFLICT(user_id, media_kind, media_id) DO UPDATE SET
                   position_seconds = excluded.position_seconds,
                   duration_seconds = excluded.duration_seconds,
                   completed = excluded.completed,
                   updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(media_id)
        .bind(position_seconds)
        .bind(duration_seconds)
        .bind(completed)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(WatchProgressRow {
            user_id,
            media_kind: kind.to_string(),
            media_id,
            position_seconds,
            duration_seconds,
            completed,
            updated_at: now,
        })
    }

    pub async fn get_progress(
        &self,
        user_id: i64,
        kind: MediaKind,
        media_id: i64,
    ) -> Result<Option<WatchProgressRow>> {
        Ok(sqlx::query_as::<_, WatchProgressRow>(
            "SELECT * FROM watch_progress WHERE user_id = ? AND media_kind = ? AND media_id = ?",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Items where `completed = false AND position > 0`, newest first
    /// (spec §4.4, §4.11).
    pub async fn continue_watching(&self, user_id: i64, limit: i64) -> Result<Vec<WatchProgressRow>> {
        Ok(sqlx::query_as::<_, WatchProgressRow>(
            r#"SELECT * FROM watch_progress
               WHERE user_id = ? AND completed = 0 AND position_seconds > 0
               ORDER BY updated_at DESC LIMIT ?"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
