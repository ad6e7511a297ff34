//! Self-hosted media server: ingest, catalog, live HLS transcoding, and
//! virtual channels (spec §1-§2).

mod channel;
mod chrono_now;
mod config;
mod config_file;
mod error;
mod extras;
mod hls;
mod http;
mod ids;
mod metadata;
mod parser;
mod probe;
mod rules;
mod scan;
mod store;
mod stream;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::hls::HlsManager;
use crate::http::{create_router, AppState};
use crate::metadata::{MetadataProvider, TmdbProvider};
use crate::scan::ScanOrchestrator;
use crate::store::Store;

const APP_NAME: &str = "nestor-server";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = match config_file::load(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("failed to load config file {}: {}. Using defaults.", config_path, e);
            ServerConfig::default().apply_env_overrides()
        }
    };
    tracing::info!(host = %config.host, port = config.port, "configuration loaded");

    let store = Arc::new(Store::connect(&config.store_path).await?);
    tokio::fs::create_dir_all(&config.hls.transcode_dir).await?;

    let metadata: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(&config.metadata));
    let scan = Arc::new(ScanOrchestrator::new(
        store.clone(),
        metadata,
        config.metadata.enabled,
        config.scan.clone(),
    ));
    let hls = Arc::new(HlsManager::new(config.hls.clone()));
    let config = Arc::new(config);

    if let Err(e) = scan::spawn_watcher(scan.clone()).await {
        tracing::warn!(error = %e, "failed to start filesystem watcher; continuing without live updates");
    }

    let state = Arc::new(AppState::new(store, scan, hls.clone(), config.clone()));
    let app = create_router(state);

    let addr: SocketAddr = config.socket_addr().parse().map_err(|e| {
        crate::error::AppError::ValidationError {
            field: "host/port".to_string(),
            message: format!("{e}"),
        }
    })?;
    tracing::info!("starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| crate::error::AppError::ExternalFailure(format!("failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hls))
        .await
        .map_err(|e| crate::error::AppError::ExternalFailure(format!("server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal(hls: Arc<HlsManager>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received, stopping live transcode sessions");
    hls.stop_all().await;
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nestor_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
