//! Catalog Store (C4): typed access over the relational schema.
//!
//! Single writer, many readers (spec §4.4, §5). `sqlx::SqlitePool` already
//! serializes physical writes to the file; `write_lock` additionally
//! serializes multi-statement transactions (playlist reorder, ingest +
//! section-assign) so they observe a consistent view end to end, the way
//! `Dastari-librarian`'s repository layer keeps one `PgPool` per
//! repository and composes transactions at the service layer.

pub mod channels;
pub mod extras;
pub mod media;
pub mod models;
pub mod playlists;
pub mod progress;
pub mod schema;
pub mod sections;
pub mod shows;
pub mod sources;
pub mod watchlist;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;

use crate::error::Result;

pub struct Store {
    pool: SqlitePool,
    /// Serializes multi-statement write sequences. Single-row upserts rely
    /// on SQLite's own locking; this guards compound operations.
    write_lock: Mutex<()>,
}

impl Store {
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
            .map_err(|e| crate::error::AppError::StoreError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| crate::error::AppError::StoreError(e.to_string()))?;

        let store = Store {
            pool,
            write_lock: Mutex::new(()),
        };
        store.migrate().await?;
        Ok(store)
    }

    #[cfg(test)]
    pub async fn connect_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| crate::error::AppError::StoreError(e.to_string()))?;
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .ok();
        let store = Store {
            pool,
            write_lock: Mutex::new(()),
        };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire the write-sequence lock for a compound operation.
    pub async fn write_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
