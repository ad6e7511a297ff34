//! HLS Session Manager (C8, spec §4.9): owns the lifecycle of a live
//! transcode subprocess per media item, single-flight, state-machine
//! driven. Grounded on the teacher's `DashMap<String, Arc<_>>` registry
//! shape in `state.rs`, generalized from in-process decode state to an
//! external `ffmpeg` child process per `dog4ik-media-server::library.rs`'s
//! subprocess idiom.

pub mod encoder;
pub mod subtitle;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::config::HlsConfig;
use crate::error::{AppError, Result};
use encoder::Profile;

/// Where a session currently sits in its lifecycle (spec §4.9: "None ->
/// StartRequest -> Spawning -> Running -> Terminal|Cancelled").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Spawning,
    Running,
    Terminal,
    Cancelled,
    Failed(String),
}

pub struct Session {
    pub media_id: i64,
    pub output_dir: PathBuf,
    state: AsyncMutex<SessionState>,
    child: AsyncMutex<Option<Child>>,
    cancelled: AtomicBool,
}

impl Session {
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    async fn set_state(&self, s: SessionState) {
        *self.state.lock().await = s;
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join("manifest.m3u8")
    }

    pub fn segment_path(&self, n: u32) -> PathBuf {
        self.output_dir.join(format!("segment{n}.ts"))
    }
}

pub struct HlsManager {
    sessions: DashMap<i64, std::sync::Arc<Session>>,
    /// One lock per media-id, held for the duration of a spawn attempt, so
    /// two concurrent callers serialize on "does a session already exist"
    /// instead of both observing `None` and each spawning their own
    /// `ffmpeg` process (spec §4.8/§5 "at most one encoder process per
    /// media-id", property P6).
    spawn_locks: DashMap<i64, std::sync::Arc<AsyncMutex<()>>>,
    config: HlsConfig,
}

impl HlsManager {
    pub fn new(config: HlsConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            spawn_locks: DashMap::new(),
            config,
        }
    }

    /// Returns the live session for `media_id`, starting a fresh one if
    /// none exists or the previous one terminated (spec §4.9: single-flight
    /// per media id — concurrent viewers of the same item share one
    /// transcode).
    pub async fn ensure_session(
        &self,
        media_id: i64,
        source: &Path,
        source_height: Option<u32>,
    ) -> Result<std::sync::Arc<Session>> {
        if let Some(existing) = self.sessions.get(&media_id) {
            let state = existing.state().await;
            if !matches!(state, SessionState::Cancelled | SessionState::Failed(_)) {
                return Ok(existing.clone());
            }
        }

        let lock = self
            .spawn_locks
            .entry(media_id)
            .or_insert_with(|| std::sync::Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check now that we hold the per-media-id lock: whoever got
        // here first may already have finished spawning while we waited.
        if let Some(existing) = self.sessions.get(&media_id) {
            let state = existing.state().await;
            if !matches!(state, SessionState::Cancelled | SessionState::Failed(_)) {
                return Ok(existing.clone());
            }
        }

        self.spawn(media_id, source, source_height).await
    }

    async fn spawn(
        &self,
        media_id: i64,
        source: &Path,
        source_height: Option<u32>,
    ) -> Result<std::sync::Arc<Session>> {
        let output_dir = self.config.transcode_dir.join(media_id.to_string());
        tokio::fs::create_dir_all(&output_dir).await?;

        let profile = Profile::for_source_height(source_height);
        let args = encoder::build_args(
            source,
            &output_dir,
            profile,
            self.config.hw_accel,
            &self.config.software_preset,
            self.config.segment_target_secs,
        );

        info!(media_id, ?profile, "spawning transcode session");

        let child = tokio::process::Command::new("ffmpeg")
            .args(&args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| AppError::ExternalFailure(format!("failed to spawn ffmpeg: {e}")))?;

        let session = std::sync::Arc::new(Session {
            media_id,
            output_dir,
            state: AsyncMutex::new(SessionState::Spawning),
            child: AsyncMutex::new(Some(child)),
            cancelled: AtomicBool::new(false),
        });
        self.sessions.insert(media_id, session.clone());

        let watch_session = session.clone();
        tokio::spawn(async move {
            watch_child(watch_session).await;
        });

        Ok(session)
    }

    /// Polls every `poll_interval_ms` until `n` segments exist or the
    /// manifest reaches `#EXT-X-ENDLIST`, up to `wait_timeout_secs` (spec
    /// §4.9: "wait for >= n segments, 500ms granularity, 30s ceiling").
    pub async fn wait_for_segments(&self, media_id: i64, n: u32) -> Result<()> {
        let session = self
            .sessions
            .get(&media_id)
            .map(|s| s.clone())
            .ok_or(AppError::NotFound { kind: "session" })?;

        let deadline = Duration::from_secs(self.config.wait_timeout_secs);
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let start = tokio::time::Instant::now();

        loop {
            if matches!(session.state().await, SessionState::Failed(_)) {
                return Err(AppError::ExternalFailure(
                    "transcode session failed before segments were ready".into(),
                ));
            }
            let available = count_ready_segments(&session.output_dir, n).await;
            if available >= n || manifest_complete(&session.manifest_path()).await {
                return Ok(());
            }
            if start.elapsed() >= deadline {
                return Err(AppError::TranscodeTimeout);
            }
            tokio::time::sleep(poll).await;
        }
    }

    pub async fn wait_for_segment(&self, media_id: i64, segment: u32) -> Result<()> {
        self.wait_for_segments(media_id, segment + 1).await
    }

    /// Cooperative cancellation: kills the child and marks the session
    /// cancelled. Segments already on disk are retained (spec §4.9 "partial
    /// segments retained on cancel").
    pub async fn stop_session(&self, media_id: i64) -> Result<()> {
        let Some(entry) = self.sessions.get(&media_id) else {
            return Ok(());
        };
        let session = entry.clone();
        drop(entry);

        session.cancelled.store(true, Ordering::SeqCst);
        let mut child_guard = session.child.lock().await;
        if let Some(mut child) = child_guard.take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
        drop(child_guard);
        session.set_state(SessionState::Cancelled).await;
        Ok(())
    }

    pub async fn session_state(&self, media_id: i64) -> Option<SessionState> {
        match self.sessions.get(&media_id) {
            Some(s) => Some(s.state().await),
            None => None,
        }
    }

    pub fn session(&self, media_id: i64) -> Option<std::sync::Arc<Session>> {
        self.sessions.get(&media_id).map(|s| s.clone())
    }

    /// Stops every live session — called on graceful shutdown.
    pub async fn stop_all(&self) {
        let ids: Vec<i64> = self.sessions.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Err(e) = self.stop_session(id).await {
                warn!(media_id = id, error = %e, "failed to stop session during shutdown");
            }
        }
    }
}

async fn watch_child(session: std::sync::Arc<Session>) {
    session.set_state(SessionState::Running).await;

    let mut child_guard = session.child.lock().await;
    let Some(child) = child_guard.as_mut() else {
        return;
    };
    let mut stderr = child.stderr.take();
    drop(child_guard);

    if let Some(mut stderr) = stderr.take() {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf).await;
    }

    let status = {
        let mut child_guard = session.child.lock().await;
        match child_guard.as_mut() {
            Some(child) => child.wait().await,
            None => return,
        }
    };

    if session.cancelled.load(Ordering::SeqCst) {
        return;
    }

    match status {
        Ok(status) if status.success() => {
            session.set_state(SessionState::Terminal).await;
        }
        Ok(status) => {
            warn!(media_id = session.media_id, %status, "transcode process exited with failure");
            session
                .set_state(SessionState::Failed(format!("ffmpeg exited with {status}")))
                .await;
        }
        Err(e) => {
            session
                .set_state(SessionState::Failed(format!("wait() failed: {e}")))
                .await;
        }
    }
}

async fn count_ready_segments(dir: &Path, up_to: u32) -> u32 {
    let mut count = 0;
    for n in 0..up_to {
        if tokio::fs::metadata(dir.join(format!("segment{n}.ts")))
            .await
            .is_ok()
        {
            count += 1;
        } else {
            break;
        }
    }
    count
}

async fn manifest_complete(path: &Path) -> bool {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents.contains("#EXT-X-ENDLIST"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manifest_complete_detects_endlist_marker() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.m3u8");
        tokio::fs::write(&manifest, "#EXTM3U\n#EXT-X-ENDLIST\n")
            .await
            .unwrap();
        assert!(manifest_complete(&manifest).await);
    }

    #[tokio::test]
    async fn manifest_incomplete_without_endlist() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.m3u8");
        tokio::fs::write(&manifest, "#EXTM3U\n").await.unwrap();
        assert!(!manifest_complete(&manifest).await);
    }

    #[tokio::test]
    async fn count_ready_segments_stops_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("segment0.ts"), b"x")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("segment1.ts"), b"x")
            .await
            .unwrap();
        assert_eq!(count_ready_segments(dir.path(), 5).await, 2);
    }

    #[tokio::test]
    async fn session_not_found_for_unknown_media() {
        let manager = HlsManager::new(HlsConfig::default());
        let err = manager.wait_for_segments(999, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
