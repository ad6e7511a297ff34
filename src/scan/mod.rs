//! Scan Orchestrator (C5): walks storage roots, runs the ingest pipeline
//! per file, and runs the live filesystem watcher (spec §4.5).

mod walker;
mod watcher;

pub use watcher::spawn_watcher;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::error::{AppError, Result};
use crate::extras;
use crate::ids::{MediaKind, SectionId, StorageRootId};
use crate::metadata::{self, MetadataProvider};
use crate::parser::{self, ParsedKind};
use crate::probe::{self, TechnicalMetadata};
use crate::rules::{self, Record};
use crate::store::extras::ExtraUpsert;
use crate::store::media::MovieUpsert;
use crate::store::shows::{EpisodeUpsert, ShowUpsert};
use crate::store::Store;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanSummary {
    pub ingested: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Single-flight guard plus the dependencies the ingest pipeline needs.
/// Held once per process and shared between the HTTP admin endpoint and
/// the live watcher (spec §9 "process-wide state... explicit").
pub struct ScanOrchestrator {
    store: Arc<Store>,
    metadata: Arc<dyn MetadataProvider>,
    metadata_enabled: bool,
    config: ScanConfig,
    running: AtomicBool,
}

impl ScanOrchestrator {
    pub fn new(
        store: Arc<Store>,
        metadata: Arc<dyn MetadataProvider>,
        metadata_enabled: bool,
        config: ScanConfig,
    ) -> Self {
        Self {
            store,
            metadata,
            metadata_enabled,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Full scan over every enabled storage root. Returns `ConflictBusy`
    /// immediately if a scan is already in flight (spec §4.5 "single-flight").
    pub async fn run_full_scan(&self) -> Result<ScanSummary> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AppError::ConflictBusy("scan already running".to_string()));
        }
        let result = self.run_full_scan_inner().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_full_scan_inner(&self) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        let roots = self.store.list_enabled_storage_roots().await?;
        for root in roots {
            let root_path = PathBuf::from(&root.path);
            let files = walker::walk_supported_files(&root_path, &self.config.supported_extensions).await?;
            for file in &files {
                if walker::looks_like_extras_path(&root_path, file) {
                    continue;
                }
                match self.ingest_file(StorageRootId(root.id), &root_path, file).await {
                    Ok(true) => summary.ingested += 1,
                    Ok(false) => summary.skipped += 1,
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "ingest failed");
                        summary.errors += 1;
                    }
                }
            }
            for file in &files {
                if !walker::looks_like_extras_path(&root_path, file) {
                    continue;
                }
                if let Err(e) = self.ingest_extra(&root_path, file).await {
                    warn!(path = %file.display(), error = %e, "extras ingest failed");
                    summary.errors += 1;
                }
            }
            self.store
                .touch_last_scan(StorageRootId(root.id), &chrono::Utc::now().to_rfc3339())
                .await?;
        }
        info!(ingested = summary.ingested, skipped = summary.skipped, errors = summary.errors, "scan complete");
        Ok(summary)
    }

    /// Ingest pipeline for one non-extras file (spec §4.5 steps 1-8).
    /// Returns `Ok(true)` if the file was newly ingested or refreshed,
    /// `Ok(false)` if it was already fully catalogued and skipped.
    pub async fn ingest_file(&self, root_id: StorageRootId, root_path: &Path, path: &Path) -> Result<bool> {
        if !walker::has_supported_extension(path, &self.config.supported_extensions) {
            return Ok(false);
        }

        let path_str = path.to_string_lossy().to_string();
        let existing_movie = self.store.find_movie_by_path(&path_str).await?;
        let existing_episode = self.store.find_episode_by_path(&path_str).await?;

        // Refresh is only meaningful for movies: a show's tmdb id is
        // attached at show-creation time, not per-episode.
        let needs_enrichment_only = existing_movie.as_ref().is_some_and(|m| m.tmdb_id.is_none());
        let already_catalogued = existing_movie.is_some() || existing_episode.is_some();
        if already_catalogued && !needs_enrichment_only {
            return Ok(false);
        }

        let parsed = parser::parse(path);
        let technical = match probe::probe(path).await {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "probe failed, continuing with empty technical fields");
                TechnicalMetadata::default()
            }
        };
        let file_size = tokio::fs::metadata(path).await.map(|m| m.len() as i64).unwrap_or(0);

        let mut title = parsed.title.clone();
        let mut year = parsed.year;
        let mut overview = None;
        let mut poster_ref = None;
        let mut backdrop_ref = None;
        let mut rating = None;
        let mut runtime_minutes = None;
        let mut genres: Vec<String> = Vec::new();
        let mut tmdb_id = None;
        let mut imdb_id = parsed.imdb_id.clone();

        if self.config_metadata_enabled() {
            match parsed.kind {
                Some(ParsedKind::Episode) => {
                    if let Some(details) = metadata::enrich_show(self.metadata.as_ref(), &title, year).await {
                        title = details.title;
                        year = year.or(details.year);
                        overview = details.overview;
                        poster_ref = details.poster_ref;
                        backdrop_ref = details.backdrop_ref;
                        rating = details.rating;
                        genres = details.genres;
                        tmdb_id = Some(details.external_id);
                        imdb_id = imdb_id.or(details.imdb_id);
                    }
                }
                _ => {
                    if let Some(details) = metadata::enrich_movie(self.metadata.as_ref(), &title, year).await {
                        title = details.title;
                        year = year.or(details.year);
                        overview = details.overview;
                        poster_ref = details.poster_ref;
                        backdrop_ref = details.backdrop_ref;
                        rating = details.rating;
                        runtime_minutes = details.runtime_minutes;
                        genres = details.genres;
                        tmdb_id = Some(details.external_id);
                        imdb_id = imdb_id.or(details.imdb_id);
                    }
                }
            }
        }

        let audio_tracks_json = serde_json::to_string(&technical.audio_tracks).unwrap_or_default();
        let subtitle_tracks_json = serde_json::to_string(&technical.subtitle_tracks).unwrap_or_default();

        match parsed.kind {
            Some(ParsedKind::Episode) => {
                let show_id = self
                    .store
                    .get_or_create_show(&ShowUpsert {
                        title: title.clone(),
                        year,
                        overview: overview.clone(),
                        poster_ref: poster_ref.clone(),
                        backdrop_ref: backdrop_ref.clone(),
                        rating,
                        genres: genres.clone(),
                        tmdb_id: tmdb_id.clone(),
                        imdb_id: imdb_id.clone(),
                    })
                    .await?;
                let season_number = parsed.season.unwrap_or(0);
                let season_id = self.store.get_or_create_season(show_id, season_number).await?;
                let episode_id = self
                    .store
                    .upsert_episode(&EpisodeUpsert {
                        show_id: show_id.get(),
                        season_id: season_id.get(),
                        season_number,
                        episode_number: parsed.episode.unwrap_or(0),
                        title: None,
                        overview: None,
                        airdate: None,
                        rating: None,
                        runtime_minutes: None,
                        root_id: Some(root_id.get()),
                        file_path: path_str,
                        file_size,
                        duration_seconds: technical.duration_seconds,
                        video_codec: technical.video_codec.clone(),
                        audio_codec: technical.audio_codec.clone(),
                        resolution: technical.resolution.clone(),
                        audio_tracks_json,
                        subtitle_tracks_json,
                    })
                    .await?;

                self.autotag_record(
                    MediaKind::Episode,
                    episode_id.get(),
                    Record {
                        kind: "episode".to_string(),
                        title,
                        year,
                        genres,
                        rating,
                        resolution: technical.resolution,
                        video_codec: technical.video_codec,
                        audio_codec: technical.audio_codec,
                    },
                )
                .await?;
            }
            _ => {
                let media_id = self
                    .store
                    .upsert_movie(&MovieUpsert {
                        title: title.clone(),
                        original_title: None,
                        year,
                        overview,
                        poster_ref,
                        backdrop_ref,
                        rating,
                        runtime_minutes,
                        genres: genres.clone(),
                        tmdb_id,
                        imdb_id,
                        root_id: Some(root_id.get()),
                        file_path: path_str,
                        file_size,
                        duration_seconds: technical.duration_seconds,
                        video_codec: technical.video_codec.clone(),
                        audio_codec: technical.audio_codec.clone(),
                        resolution: technical.resolution.clone(),
                        audio_tracks_json,
                        subtitle_tracks_json,
                    })
                    .await?;

                self.autotag_record(
                    MediaKind::Movie,
                    media_id.get(),
                    Record {
                        kind: "movie".to_string(),
                        title,
                        year,
                        genres,
                        rating,
                        resolution: technical.resolution,
                        video_codec: technical.video_codec,
                        audio_codec: technical.audio_codec,
                    },
                )
                .await?;
            }
        }

        Ok(true)
    }

    pub(crate) async fn ingest_extra(&self, root_path: &Path, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();
        let parsed = parser::parse_extra(path);
        let technical = match probe::probe(path).await {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "probe failed for extra, continuing with empty technical fields");
                TechnicalMetadata::default()
            }
        };
        let file_size = tokio::fs::metadata(path).await.map(|m| m.len() as i64).unwrap_or(0);
        let links = extras::link(&self.store, root_path, path, &parsed).await?;

        self.store
            .upsert_extra(&ExtraUpsert {
                title: parsed.title,
                category: parsed.category.map(|c| c.as_str().to_string()).unwrap_or_else(|| "other".to_string()),
                movie_id: links.movie_id,
                tv_show_id: links.tv_show_id,
                episode_id: links.episode_id,
                season_number: parsed.season,
                episode_number: parsed.episode,
                file_path: path_str,
                file_size,
                duration_seconds: technical.duration_seconds,
                video_codec: technical.video_codec,
                audio_codec: technical.audio_codec,
                resolution: technical.resolution,
                audio_tracks_json: serde_json::to_string(&technical.audio_tracks).unwrap_or_default(),
                subtitle_tracks_json: serde_json::to_string(&technical.subtitle_tracks).unwrap_or_default(),
            })
            .await?;
        Ok(())
    }

    /// Re-evaluates every smart section against a freshly catalogued
    /// record and inserts membership rows for matches (spec §4.5 step 8,
    /// §4.7).
    async fn autotag_record(&self, kind: MediaKind, media_id: i64, record: Record) -> Result<()> {
        let sections = self.store.list_sections().await?;
        for section in sections {
            if section.section_type != "smart" {
                continue;
            }
            let rules = self.store.list_rules(SectionId(section.id)).await?;
            if rules::evaluate(&record, &rules) {
                self.store.autotag_member(SectionId(section.id), kind, media_id).await?;
            }
        }
        Ok(())
    }

    fn config_metadata_enabled(&self) -> bool {
        self.metadata_enabled
    }

    pub(crate) fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub(crate) fn scan_config(&self) -> &ScanConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MovieCandidate, MovieDetails, ShowCandidate, ShowDetails};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl MetadataProvider for NullProvider {
        async fn search_movie(&self, _title: &str, _year: Option<i32>) -> Option<Vec<MovieCandidate>> {
            None
        }
        async fn movie_details(&self, _external_id: &str) -> Option<MovieDetails> {
            None
        }
        async fn search_show(&self, _title: &str, _year: Option<i32>) -> Option<Vec<ShowCandidate>> {
            None
        }
        async fn show_details(&self, _external_id: &str) -> Option<ShowDetails> {
            None
        }
    }

    async fn orchestrator() -> ScanOrchestrator {
        let store = Arc::new(Store::connect_memory().await.unwrap());
        ScanOrchestrator::new(store, Arc::new(NullProvider), false, ScanConfig::default())
    }

    #[tokio::test]
    async fn unsupported_extension_is_skipped() {
        let orch = orchestrator().await;
        let result = orch
            .ingest_file(StorageRootId(1), Path::new("/root"), Path::new("/root/notes.txt"))
            .await
            .unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn second_run_is_single_flight_guarded() {
        let orch = Arc::new(orchestrator().await);
        orch.running.store(true, Ordering::SeqCst);
        let err = orch.run_full_scan().await.unwrap_err();
        assert!(matches!(err, AppError::ConflictBusy(_)));
    }
}
