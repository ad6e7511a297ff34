//! Playlist / PlaylistItem repository (spec §3, §4.11, property P3).

use sqlx::Row;

use super::models::{PlaylistItemRow, PlaylistRow};
use super::{now_rfc3339, Store};
use crate::error::{AppError, Result};
use crate::ids::{MediaKind, PlaylistId};

impl Store {
    pub async fn create_playlist(
        &self,
        owner_user_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<PlaylistId> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        let row = sqlx::query(
            "INSERT INTO playlists (owner_user_id, name, description, created_at, updated_at) VALUES (?,?,?,?,?) RETURNING id",
        )
        .bind(owner_user_id)
        .bind(name)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(PlaylistId(row.get::<i64, _>("id")))
    }

    pub async fn get_playlist(&self, id: PlaylistId) -> Result<PlaylistRow> {
        sqlx::query_as::<_, PlaylistRow>("SELECT * FROM playlists WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "playlist" })
    }

    pub async fn list_playlists(&self, owner_user_id: i64) -> Result<Vec<PlaylistRow>> {
        Ok(sqlx::query_as::<_, PlaylistRow>(
            "SELECT * FROM playlists WHERE owner_user_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn delete_playlist(&self, id: PlaylistId) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM playlist_items WHERE playlist_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_playlist_items(&self, playlist_id: PlaylistId) -> Result<Vec<PlaylistItemRow>> {
        Ok(sqlx::query_as::<_, PlaylistItemRow>(
            "SELECT * FROM playlist_items WHERE playlist_id = ? ORDER BY position ASC",
        )
        .bind(playlist_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    /// Append with `position = max(position) + 1` (spec §4.11).
    pub async fn add_playlist_item(
        &self,
        playlist_id: PlaylistId,
        kind: MediaKind,
        media_id: i64,
    ) -> Result<()> {
        let _guard = self.write_guard().await;
        let next_position: i64 = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM playlist_items WHERE playlist_id = ?",
        )
        .bind(playlist_id.get())
        .fetch_one(&self.pool)
        .await?
        .get("next");

        sqlx::query(
            "INSERT INTO playlist_items (playlist_id, media_kind, media_id, position) VALUES (?,?,?,?)",
        )
        .bind(playlist_id.get())
        .bind(kind.to_string())
        .bind(media_id)
        .bind(next_position)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove and renumber so positions remain contiguous `1..N`
    /// (spec §4.11, property P3).
    pub async fn remove_playlist_item(&self, playlist_id: PlaylistId, position: i64) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM playlist_items WHERE playlist_id = ? AND position = ?")
            .bind(playlist_id.get())
            .bind(position)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE playlist_items SET position = position - 1 WHERE playlist_id = ? AND position > ?",
        )
        .bind(playlist_id.get())
        .bind(position)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Rewrite positions atomically from a caller-supplied ordering of
    /// `(kind, media_id)` pairs (spec §4.11 "Reorder").
    pub async fn reorder_playlist(
        &self,
        playlist_id: PlaylistId,
        ordered: &[(MediaKind, i64)],
    ) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        // Two-phase: shift into a disjoint range first so UNIQUE(playlist_id, position)
        // never collides mid-update.
        sqlx::query("UPDATE playlist_items SET position = -position WHERE playlist_id = ?")
            .bind(playlist_id.get())
            .execute(&mut *tx)
            .await?;
        for (position, (kind, media_id)) in ordered.iter().enumerate() {
            sqlx::query(
                "UPDATE playlist_items SET position = ? WHERE playlist_id = ? AND media_kind = ? AND media_id = ?",
            )
            .bind(position as i64 + 1)
            .bind(playlist_id.get())
            .bind(kind.to_string())
            .bind(media_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
