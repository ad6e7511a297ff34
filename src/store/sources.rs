//! Storage root repository (spec §3).

use sqlx::Row;

use super::models::StorageRootRow;
use super::Store;
use crate::error::{AppError, Result};
use crate::ids::StorageRootId;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct StorageRootUpsert {
    pub name: String,
    pub path: String,
    pub kind: String,
    pub credentials: Option<String>,
    pub enabled: bool,
}

impl Store {
    pub async fn create_storage_root(&self, r: &StorageRootUpsert) -> Result<StorageRootId> {
        let _guard = self.write_guard().await;
        let row = sqlx::query(
            "INSERT INTO storage_roots (name, path, kind, credentials, enabled) VALUES (?,?,?,?,?) RETURNING id",
        )
        .bind(&r.name)
        .bind(&r.path)
        .bind(&r.kind)
        .bind(&r.credentials)
        .bind(r.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(StorageRootId(row.get::<i64, _>("id")))
    }

    pub async fn delete_storage_root(&self, id: StorageRootId) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query("DELETE FROM storage_roots WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_storage_root(&self, id: StorageRootId) -> Result<StorageRootRow> {
        sqlx::query_as::<_, StorageRootRow>("SELECT * FROM storage_roots WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "storage_root" })
    }

    pub async fn list_storage_roots(&self) -> Result<Vec<StorageRootRow>> {
        Ok(sqlx::query_as::<_, StorageRootRow>("SELECT * FROM storage_roots ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_enabled_storage_roots(&self) -> Result<Vec<StorageRootRow>> {
        Ok(sqlx::query_as::<_, StorageRootRow>(
            "SELECT * FROM storage_roots WHERE enabled = 1 ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn touch_last_scan(&self, id: StorageRootId, at: &str) -> Result<()> {
        sqlx::query("UPDATE storage_roots SET last_scan_at = ? WHERE id = ?")
            .bind(at)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
