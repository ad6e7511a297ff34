//! Shared application state injected into every handler — explicit
//! fields rather than module-level statics (spec §9 "Process-wide state
//! made explicit").

use std::sync::Arc;

use crate::channel;
use crate::config::ServerConfig;
use crate::hls::HlsManager;
use crate::scan::ScanOrchestrator;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub scan: Arc<ScanOrchestrator>,
    pub hls: Arc<HlsManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        scan: Arc<ScanOrchestrator>,
        hls: Arc<HlsManager>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            store,
            scan,
            hls,
            config,
        }
    }

    /// Regenerates a channel's schedule in place (spec §4.10).
    pub async fn regenerate_channel(&self, id: crate::ids::ChannelId) -> crate::error::Result<()> {
        channel::regenerate(&self.store, id).await
    }
}
