//! Schema declaration and additive migrations.
//!
//! Declared idempotently on every startup (`CREATE TABLE IF NOT EXISTS`);
//! additive-only migrations after that are attempted and their failures
//! ignored, since "duplicate column" is the expected steady-state outcome
//! (spec §4.4).

use super::Store;
use crate::error::Result;

const CREATE_TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_verifier TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS storage_roots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        path TEXT NOT NULL,
        kind TEXT NOT NULL,
        credentials TEXT,
        enabled INTEGER NOT NULL DEFAULT 1,
        last_scan_at TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS media (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL DEFAULT 'movie',
        title TEXT NOT NULL,
        original_title TEXT,
        year INTEGER,
        overview TEXT,
        poster_ref TEXT,
        backdrop_ref TEXT,
        rating REAL,
        runtime_minutes INTEGER,
        genres TEXT NOT NULL DEFAULT '',
        tmdb_id TEXT,
        imdb_id TEXT,
        root_id INTEGER REFERENCES storage_roots(id),
        file_path TEXT NOT NULL UNIQUE,
        file_size INTEGER NOT NULL DEFAULT 0,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        video_codec TEXT,
        audio_codec TEXT,
        resolution TEXT,
        audio_tracks TEXT NOT NULL DEFAULT '[]',
        subtitle_tracks TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_media_type ON media(kind)",
    "CREATE INDEX IF NOT EXISTS idx_media_title ON media(title)",
    r#"CREATE TABLE IF NOT EXISTS shows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        year INTEGER,
        overview TEXT,
        poster_ref TEXT,
        backdrop_ref TEXT,
        rating REAL,
        genres TEXT NOT NULL DEFAULT '',
        tmdb_id TEXT,
        imdb_id TEXT,
        season_count INTEGER NOT NULL DEFAULT 0,
        episode_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(title, year)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS seasons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        show_id INTEGER NOT NULL REFERENCES shows(id),
        season_number INTEGER NOT NULL,
        title TEXT,
        overview TEXT,
        poster_ref TEXT,
        episode_count INTEGER NOT NULL DEFAULT 0,
        UNIQUE(show_id, season_number)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS episodes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        show_id INTEGER NOT NULL REFERENCES shows(id),
        season_id INTEGER NOT NULL REFERENCES seasons(id),
        season_number INTEGER NOT NULL,
        episode_number INTEGER NOT NULL,
        title TEXT,
        overview TEXT,
        airdate TEXT,
        rating REAL,
        runtime_minutes INTEGER,
        root_id INTEGER REFERENCES storage_roots(id),
        file_path TEXT NOT NULL UNIQUE,
        file_size INTEGER NOT NULL DEFAULT 0,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        video_codec TEXT,
        audio_codec TEXT,
        resolution TEXT,
        audio_tracks TEXT NOT NULL DEFAULT '[]',
        subtitle_tracks TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(show_id, season_number, episode_number)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_episodes_show ON episodes(show_id)",
    "CREATE INDEX IF NOT EXISTS idx_episodes_season ON episodes(season_id)",
    r#"CREATE TABLE IF NOT EXISTS extras (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'other',
        movie_id INTEGER REFERENCES media(id),
        tv_show_id INTEGER REFERENCES shows(id),
        episode_id INTEGER REFERENCES episodes(id),
        season_number INTEGER,
        episode_number INTEGER,
        file_path TEXT NOT NULL UNIQUE,
        file_size INTEGER NOT NULL DEFAULT 0,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        video_codec TEXT,
        audio_codec TEXT,
        resolution TEXT,
        audio_tracks TEXT NOT NULL DEFAULT '[]',
        subtitle_tracks TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_extras_movie ON extras(movie_id)",
    "CREATE INDEX IF NOT EXISTS idx_extras_show ON extras(tv_show_id)",
    "CREATE INDEX IF NOT EXISTS idx_extras_episode ON extras(episode_id)",
    "CREATE INDEX IF NOT EXISTS idx_extras_category ON extras(category)",
    r#"CREATE TABLE IF NOT EXISTS sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        icon TEXT,
        section_type TEXT NOT NULL DEFAULT 'standard',
        display_order INTEGER NOT NULL DEFAULT 0,
        is_visible INTEGER NOT NULL DEFAULT 1
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_sections_slug ON sections(slug)",
    "CREATE INDEX IF NOT EXISTS idx_sections_visible ON sections(is_visible)",
    "CREATE INDEX IF NOT EXISTS idx_sections_order ON sections(display_order)",
    r#"CREATE TABLE IF NOT EXISTS section_rules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        section_id INTEGER NOT NULL REFERENCES sections(id),
        field TEXT NOT NULL,
        operator TEXT NOT NULL,
        value_json TEXT NOT NULL,
        rule_order INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS media_sections (
        media_kind TEXT NOT NULL,
        media_id INTEGER NOT NULL,
        section_id INTEGER NOT NULL REFERENCES sections(id),
        UNIQUE(media_kind, media_id, section_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_playlists_user ON playlists(owner_user_id)",
    r#"CREATE TABLE IF NOT EXISTS playlist_items (
        playlist_id INTEGER NOT NULL REFERENCES playlists(id),
        media_kind TEXT NOT NULL,
        media_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        UNIQUE(playlist_id, position)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_playlist_items_playlist ON playlist_items(playlist_id)",
    r#"CREATE TABLE IF NOT EXISTS watch_progress (
        user_id INTEGER NOT NULL,
        media_kind TEXT NOT NULL,
        media_id INTEGER NOT NULL,
        position_seconds REAL NOT NULL DEFAULT 0,
        duration_seconds REAL NOT NULL DEFAULT 0,
        completed INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        UNIQUE(user_id, media_kind, media_id)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_progress_user ON watch_progress(user_id)",
    r#"CREATE TABLE IF NOT EXISTS watchlist (
        user_id INTEGER NOT NULL,
        media_kind TEXT NOT NULL,
        media_id INTEGER NOT NULL,
        added_at TEXT NOT NULL,
        UNIQUE(user_id, media_kind, media_id)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_watchlist_user ON watchlist(user_id)",
    r#"CREATE TABLE IF NOT EXISTS channels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        icon TEXT,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS channel_sources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        channel_id INTEGER NOT NULL REFERENCES channels(id),
        kind TEXT NOT NULL,
        source_ref INTEGER,
        source_value TEXT,
        weight INTEGER NOT NULL DEFAULT 1,
        shuffle INTEGER NOT NULL DEFAULT 0,
        filter_options TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS channel_schedule (
        channel_id INTEGER NOT NULL REFERENCES channels(id),
        media_kind TEXT NOT NULL,
        media_id INTEGER NOT NULL,
        cycle_number INTEGER NOT NULL,
        scheduled_position INTEGER NOT NULL,
        duration_seconds INTEGER NOT NULL,
        cumulative_start_seconds INTEGER NOT NULL,
        played INTEGER NOT NULL DEFAULT 0
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_schedule_channel ON channel_schedule(channel_id, cycle_number, scheduled_position)",
];

/// Columns added after the initial release. Applied as best-effort
/// `ALTER TABLE ... ADD COLUMN`; "duplicate column name" failures are the
/// expected steady state and are swallowed.
const ADDITIVE_MIGRATIONS: &[&str] = &[
    "ALTER TABLE channels ADD COLUMN created_at TEXT NOT NULL DEFAULT '1970-01-01T00:00:00Z'",
];

impl Store {
    pub async fn migrate(&self) -> Result<()> {
        for stmt in CREATE_TABLES {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        for stmt in ADDITIVE_MIGRATIONS {
            let _ = sqlx::query(stmt).execute(&self.pool).await;
        }
        Ok(())
    }
}
