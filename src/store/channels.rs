//! Channel / ChannelSource / ScheduleEntry repository (spec §3, §4.10).

use sqlx::Row;

use super::models::{ChannelRow, ChannelSourceRow, ScheduleEntryRow};
use super::{now_rfc3339, Store};
use crate::error::{AppError, Result};
use crate::ids::{ChannelId, MediaKind};

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ChannelSourceUpsert {
    pub kind: String,
    pub source_ref: Option<i64>,
    pub source_value: Option<String>,
    pub weight: i64,
    pub shuffle: bool,
    pub filter_options: Option<String>,
}

impl Store {
    pub async fn create_channel(
        &self,
        owner_user_id: i64,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<ChannelId> {
        let _guard = self.write_guard().await;
        let now = now_rfc3339();
        let row = sqlx::query(
            "INSERT INTO channels (owner_user_id, name, description, icon, created_at) VALUES (?,?,?,?,?) RETURNING id",
        )
        .bind(owner_user_id)
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(ChannelId(row.get::<i64, _>("id")))
    }

    pub async fn get_channel(&self, id: ChannelId) -> Result<ChannelRow> {
        sqlx::query_as::<_, ChannelRow>("SELECT * FROM channels WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "channel" })
    }

    pub async fn list_channels(&self, owner_user_id: i64) -> Result<Vec<ChannelRow>> {
        Ok(sqlx::query_as::<_, ChannelRow>(
            "SELECT * FROM channels WHERE owner_user_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn delete_channel(&self, id: ChannelId) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM channel_schedule WHERE channel_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM channel_sources WHERE channel_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn add_channel_source(
        &self,
        channel_id: ChannelId,
        s: &ChannelSourceUpsert,
    ) -> Result<i64> {
        let _guard = self.write_guard().await;
        let row = sqlx::query(
            r#"INSERT INTO channel_sources (channel_id, kind, source_ref, source_value, weight, shuffle, filter_options)
               VALUES (?,?,?,?,?,?,?) RETURNING id"#,
        )
        .bind(channel_id.get())
        .bind(&s.kind)
        .bind(s.source_ref)
        .bind(&s.source_value)
        .bind(s.weight.max(1))
        .bind(s.shuffle)
        .bind(&s.filter_options)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("id"))
    }

    pub async fn remove_channel_source(&self, channel_id: ChannelId, source_id: i64) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query("DELETE FROM channel_sources WHERE channel_id = ? AND id = ?")
            .bind(channel_id.get())
            .bind(source_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_channel_sources(&self, channel_id: ChannelId) -> Result<Vec<ChannelSourceRow>> {
        Ok(sqlx::query_as::<_, ChannelSourceRow>(
            "SELECT * FROM channel_sources WHERE channel_id = ? ORDER BY id ASC",
        )
        .bind(channel_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    /// Replaces the channel's entire schedule (regenerate) in one
    /// transaction.
    pub async fn replace_schedule(
        &self,
        channel_id: ChannelId,
        entries: &[ScheduleEntryRow],
    ) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM channel_schedule WHERE channel_id = ?")
            .bind(channel_id.get())
            .execute(&mut *tx)
            .await?;
        for e in entries {
            sqlx::query(
                r#"INSERT INTO channel_schedule (
                    channel_id, media_kind, media_id, cycle_number, scheduled_position,
                    duration_seconds, cumulative_start_seconds, played
                ) VALUES (?,?,?,?,?,?,?,?)"#,
            )
            .bind(channel_id.get())
            .bind(&e.media_kind)
            .bind(e.media_id)
            .bind(e.cycle_number)
            .bind(e.scheduled_position)
            .bind(e.duration_seconds)
            .bind(e.cumulative_start_seconds)
            .bind(e.played)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// One cycle's worth of schedule entries, ordered by
    /// `(cycle_number, scheduled_position)` (spec §3 invariant).
    pub async fn list_schedule_cycle(&self, channel_id: ChannelId) -> Result<Vec<ScheduleEntryRow>> {
        Ok(sqlx::query_as::<_, ScheduleEntryRow>(
            r#"SELECT * FROM channel_schedule
               WHERE channel_id = ? AND cycle_number = 1
               ORDER BY scheduled_position ASC"#,
        )
        .bind(channel_id.get())
        .fetch_all(&self.pool)
        .await?)
    }

    /// Looks up a playable item's stored duration regardless of kind, for
    /// the scheduler's timeline math (spec §4.10).
    pub async fn media_duration_seconds(&self, kind: MediaKind, media_id: i64) -> Result<i64> {
        let table = match kind {
            MediaKind::Movie => "media",
            MediaKind::Episode => "episodes",
            MediaKind::Extra => "extras",
        };
        let sql = format!("SELECT duration_seconds FROM {table} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "media" })?;
        Ok(row.get::<i64, _>("duration_seconds"))
    }
}
