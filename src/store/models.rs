//! Typed rows returned by the catalog store.
//!
//! Each entity carries its own copy of the "technical file" fields
//! (path, size, duration, codecs, resolution, track lists) rather than
//! sharing a base record — tagged variants, not inheritance (spec §9).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    pub index: usize,
    pub language: String,
    pub codec: String,
    pub channels: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub index: usize,
    pub language: String,
    pub codec: String,
    pub title: Option<String>,
    pub forced: bool,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaRow {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<i64>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<i64>,
    pub genres: String,
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
    pub root_id: Option<i64>,
    pub file_path: String,
    pub file_size: i64,
    pub duration_seconds: i64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub audio_tracks: String,
    pub subtitle_tracks: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowRow {
    pub id: i64,
    pub title: String,
    pub year: Option<i64>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub genres: String,
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
    pub season_count: i64,
    pub episode_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeasonRow {
    pub id: i64,
    pub show_id: i64,
    pub season_number: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub episode_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EpisodeRow {
    pub id: i64,
    pub show_id: i64,
    pub season_id: i64,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub airdate: Option<String>,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<i64>,
    pub root_id: Option<i64>,
    pub file_path: String,
    pub file_size: i64,
    pub duration_seconds: i64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub audio_tracks: String,
    pub subtitle_tracks: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExtraRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub movie_id: Option<i64>,
    pub tv_show_id: Option<i64>,
    pub episode_id: Option<i64>,
    pub season_number: Option<i64>,
    pub episode_number: Option<i64>,
    pub file_path: String,
    pub file_size: i64,
    pub duration_seconds: i64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub audio_tracks: String,
    pub subtitle_tracks: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SectionRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub section_type: String,
    pub display_order: i64,
    pub is_visible: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RuleRow {
    pub id: i64,
    pub section_id: i64,
    pub field: String,
    pub operator: String,
    pub value_json: String,
    pub rule_order: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistRow {
    pub id: i64,
    pub owner_user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistItemRow {
    pub playlist_id: i64,
    pub media_kind: String,
    pub media_id: i64,
    pub position: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchProgressRow {
    pub user_id: i64,
    pub media_kind: String,
    pub media_id: i64,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub completed: bool,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchlistRow {
    pub user_id: i64,
    pub media_kind: String,
    pub media_id: i64,
    pub added_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChannelRow {
    pub id: i64,
    pub owner_user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChannelSourceRow {
    pub id: i64,
    pub channel_id: i64,
    pub kind: String,
    pub source_ref: Option<i64>,
    pub source_value: Option<String>,
    pub weight: i64,
    pub shuffle: bool,
    pub filter_options: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleEntryRow {
    pub channel_id: i64,
    pub media_kind: String,
    pub media_id: i64,
    pub cycle_number: i64,
    pub scheduled_position: i64,
    pub duration_seconds: i64,
    pub cumulative_start_seconds: i64,
    pub played: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StorageRootRow {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub credentials: Option<String>,
    pub enabled: bool,
    pub last_scan_at: Option<String>,
}
