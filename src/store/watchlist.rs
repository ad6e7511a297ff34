//! Watchlist repository (spec §3, §4.11).

use super::models::WatchlistRow;
use super::{now_rfc3339, Store};
use crate::error::Result;
use crate::ids::MediaKind;

impl Store {
    pub async fn add_watchlist(&self, user_id: i64, kind: MediaKind, media_id: i64) -> Result<()> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO watchlist (user_id, media_kind, media_id, added_at) VALUES (?,?,?,?)",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(media_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_watchlist(&self, user_id: i64, kind: MediaKind, media_id: i64) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query("DELETE FROM watchlist WHERE user_id = ? AND media_kind = ? AND media_id = ?")
            .bind(user_id)
            .bind(kind.to_string())
            .bind(media_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_in_watchlist(&self, user_id: i64, kind: MediaKind, media_id: i64) -> Result<bool> {
        let row = sqlx::query_as::<_, WatchlistRow>(
            "SELECT * FROM watchlist WHERE user_id = ? AND media_kind = ? AND media_id = ?",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn list_watchlist(&self, user_id: i64) -> Result<Vec<WatchlistRow>> {
        Ok(sqlx::query_as::<_, WatchlistRow>(
            "SELECT * FROM watchlist WHERE user_id = ? ORDER BY added_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// "mark as watched": sets `completed=true, position=duration`
    /// (spec §4.11).
    pub async fn mark_watched(
        &self,
        user_id: i64,
        kind: MediaKind,
        media_id: i64,
        duration_seconds: f64,
    ) -> Result<()> {
        self.upsert_progress(user_id, kind, media_id, duration_seconds, duration_seconds)
            .await?;
        Ok(())
    }
}
