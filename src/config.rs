//! Server configuration.
//!
//! Structure and defaulting strategy follow the teacher's `config.rs`:
//! nested sub-configs with their own `Default` impls, composed into one
//! top-level `ServerConfig`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    /// Target HLS segment duration in seconds.
    pub segment_target_secs: u32,
    /// Number of initial segments the manifest endpoint waits for before
    /// responding (spec §4.9: "wait up to 30s for >= 2 segments").
    pub initial_segments: usize,
    /// Directory under which `<media-id>/` transcode output lives.
    pub transcode_dir: PathBuf,
    /// Hardware acceleration to prefer, if any.
    pub hw_accel: HwAccel,
    /// Software x264 preset used when no hwaccel is configured.
    pub software_preset: String,
    /// How long callers wait for segments to appear, in seconds.
    pub wait_timeout_secs: u64,
    /// Polling granularity while waiting for segments, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            segment_target_secs: 4,
            initial_segments: 2,
            transcode_dir: PathBuf::from("./transcode"),
            hw_accel: HwAccel::None,
            software_preset: "veryfast".to_string(),
            wait_timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HwAccel {
    None,
    Videotoolbox,
    Cuda,
    Vaapi,
    Qsv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions considered playable media (spec §4.5 step 1).
    pub supported_extensions: Vec<String>,
    /// Debounce window for the filesystem watcher, in milliseconds.
    pub watch_debounce_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            supported_extensions: [
                "mp4", "mkv", "avi", "mov", "wmv", "m4v", "webm", "flv", "ts", "m2ts",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            watch_debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base URL of the external metadata provider (TMDB-compatible).
    pub base_url: String,
    /// API key/bearer token for the provider. Overridden by env var.
    pub api_key: String,
    /// Whether to attempt enrichment at all (disabled e.g. in offline
    /// test environments).
    pub enabled: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Path to the sqlite database file.
    pub store_path: PathBuf,

    /// Root under which browse requests (`GET /api/files`) are confined.
    pub browse_prefix: PathBuf,

    /// Secret used by the (external) auth collaborator to sign tokens.
    /// Threaded through configuration per spec §6 precedence rules even
    /// though token issuance itself lives outside this crate.
    pub jwt_secret: String,

    pub hls: HlsConfig,
    pub scan: ScanConfig,
    pub metadata: MetadataConfig,

    pub cors_enabled: bool,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_path: PathBuf::from("./nestor.db"),
            browse_prefix: PathBuf::from("/media"),
            jwt_secret: "change-me".to_string(),
            hls: HlsConfig::default(),
            scan: ScanConfig::default(),
            metadata: MetadataConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Overlay environment variables per spec §6: "config file -> environment
    /// variables override, for host, port, store path, JWT secret, and
    /// metadata-provider API key".
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NESTOR_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("NESTOR_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("NESTOR_STORE_PATH") {
            self.store_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NESTOR_JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Ok(v) = std::env::var("NESTOR_METADATA_API_KEY") {
            self.metadata.api_key = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn env_override_wins_over_file() {
        std::env::set_var("NESTOR_PORT", "9999");
        let config = ServerConfig::default().apply_env_overrides();
        assert_eq!(config.port, 9999);
        std::env::remove_var("NESTOR_PORT");
    }

    #[test]
    fn supported_extensions_cover_spec_list() {
        let scan = ScanConfig::default();
        for ext in ["mp4", "mkv", "ts", "m2ts"] {
            assert!(scan.supported_extensions.iter().any(|e| e == ext));
        }
    }
}
