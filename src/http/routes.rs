//! Axum router configuration (spec §6 HTTP surface). Keeps the teacher's
//! `Router::new() + CorsLayer + TraceLayer + .with_state()` shape.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use super::{channels, extras, files, health, library, media, playlists, progress, sections, shows, sources, stream, watchlist};

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::RANGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
            "x-user-id".parse().unwrap(),
        ])
        .allow_private_network(true)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health_check))
        // Library
        .route("/api/library/movies", get(library::list_movies))
        .route("/api/library/shows", get(library::list_shows))
        .route("/api/library/recent", get(library::list_recent))
        .route("/api/library/scan", post(library::trigger_scan))
        .route("/api/library/prune-preview", get(library::prune_preview))
        // Media
        .route("/api/media/{id}", get(media::get_media))
        // Shows / TV hierarchy
        .route("/api/shows/{id}", get(shows::get_show))
        .route("/api/shows/{id}/seasons", get(shows::list_seasons))
        .route("/api/shows/{id}/seasons/{n}", get(shows::get_season))
        .route("/api/shows/{id}/seasons/{n}/episodes", get(shows::list_season_episodes))
        .route("/api/shows/{id}/episodes", get(shows::list_episodes))
        .route("/api/shows/{id}/random", get(shows::random_episode))
        .route("/api/shows/{id}/seasons/{n}/random", get(shows::random_episode_in_season))
        // Extras
        .route("/api/extras", get(extras::list_extras))
        .route("/api/extras/categories", get(extras::list_categories))
        .route("/api/extras/category/{c}", get(extras::list_by_category))
        .route("/api/extras/{id}", get(extras::get_extra))
        // Streaming (C9)
        .route("/api/stream/{id}/manifest.m3u8", get(stream::manifest))
        .route("/api/stream/{id}/segment/{n}.ts", get(stream::segment))
        .route("/api/stream/{id}/subtitles/{lang}.vtt", get(stream::subtitles))
        .route("/api/stream/{id}/direct", get(stream::direct))
        .route("/api/stream/{id}/transcode", delete(stream::stop_transcode))
        // Progress / continue-watching
        .route("/api/progress/{media_id}", get(progress::get_progress).post(progress::update_progress))
        .route("/api/continue-watching", get(progress::continue_watching))
        // Watchlist
        .route("/api/watchlist", get(watchlist::list_watchlist).post(watchlist::add_watchlist).delete(watchlist::remove_watchlist))
        .route("/api/watchlist/watched", post(watchlist::mark_watched))
        // Playlists
        .route("/api/playlists", get(playlists::list_playlists).post(playlists::create_playlist))
        .route("/api/playlists/{id}", get(playlists::get_playlist).delete(playlists::delete_playlist))
        .route("/api/playlists/{id}/items", get(playlists::list_items).post(playlists::add_item))
        .route("/api/playlists/{id}/items/{position}", delete(playlists::remove_item))
        .route("/api/playlists/{id}/reorder", put(playlists::reorder))
        // Sections
        .route("/api/sections", get(sections::list_sections).post(sections::create_section))
        .route("/api/sections/{id}", get(sections::get_section).put(sections::update_section).delete(sections::delete_section))
        .route("/api/sections/{id}/media", get(sections::list_section_media))
        .route("/api/sections/{id}/rules", get(sections::list_rules).put(sections::set_rules))
        .route("/api/sections/{id}/members", post(sections::add_member).delete(sections::remove_member))
        .route("/api/sections/reorder", put(sections::reorder_sections))
        // Channels
        .route("/api/channels", get(channels::list_channels).post(channels::create_channel))
        .route("/api/channels/{id}", get(channels::get_channel).delete(channels::delete_channel))
        .route("/api/channels/{id}/sources", get(channels::list_sources).post(channels::add_source))
        .route("/api/channels/{id}/sources/{source_id}", delete(channels::remove_source))
        .route("/api/channels/{id}/regenerate", post(channels::regenerate))
        .route("/api/channels/{id}/now-playing", get(channels::now_playing))
        .route("/api/channels/{id}/schedule", get(channels::schedule))
        // Storage roots / directory browse
        .route("/api/sources", get(sources::list_sources).post(sources::create_source))
        .route("/api/sources/{id}", delete(sources::delete_source))
        .route("/api/files", get(files::browse))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::hls::HlsManager;
    use crate::scan::ScanOrchestrator;
    use crate::store::Store;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    struct NullProvider;

    #[async_trait]
    impl crate::metadata::MetadataProvider for NullProvider {
        async fn search_movie(&self, _title: &str, _year: Option<i32>) -> Option<Vec<crate::metadata::MovieCandidate>> {
            None
        }
        async fn movie_details(&self, _external_id: &str) -> Option<crate::metadata::MovieDetails> {
            None
        }
        async fn search_show(&self, _title: &str, _year: Option<i32>) -> Option<Vec<crate::metadata::ShowCandidate>> {
            None
        }
        async fn show_details(&self, _external_id: &str) -> Option<crate::metadata::ShowDetails> {
            None
        }
    }

    async fn test_state() -> Arc<AppState> {
        let store = Arc::new(Store::connect_memory().await.unwrap());
        let config = Arc::new(ServerConfig::default());
        let scan = Arc::new(ScanOrchestrator::new(
            store.clone(),
            Arc::new(NullProvider),
            false,
            config.scan.clone(),
        ));
        let hls = Arc::new(HlsManager::new(config.hls.clone()));
        Arc::new(AppState::new(store, scan, hls, config))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = create_router(test_state().await);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_preflight_allows_get() {
        let app = create_router(test_state().await);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/library/movies")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
