//! Live filesystem watcher (spec §4.5 "Live watcher"): subscribes
//! recursively under every enabled storage root. `CREATE` feeds the
//! single-file ingest pipeline; `REMOVE`/`RENAME` only log, matching the
//! "don't delete on transient unmount" rule (spec §9 Open Question).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::walker;
use super::ScanOrchestrator;
use crate::error::{AppError, Result};

/// Spawns one recommended watcher per enabled storage root and a task
/// that drains their events into the ingest pipeline. Returns once
/// watchers are registered; the drain task runs for the life of the
/// process.
pub async fn spawn_watcher(orchestrator: Arc<ScanOrchestrator>) -> Result<()> {
    let roots = orchestrator.store().list_enabled_storage_roots().await?;
    if roots.is_empty() {
        return Ok(());
    }

    let root_paths: Vec<(PathBuf, i64)> = roots.iter().map(|r| (PathBuf::from(&r.path), r.id)).collect();
    let debounce = Duration::from_millis(orchestrator.scan_config().watch_debounce_ms);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<(PathBuf, EventKind)>();
    let mut watchers = Vec::new();

    for (root_path, _) in &root_paths {
        let tx = tx.clone();
        let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                for path in event.paths.clone() {
                    let _ = tx.send((path, event.kind));
                }
            }
        })
        .map_err(|e| AppError::ExternalFailure(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(root_path, RecursiveMode::Recursive)
            .map_err(|e| AppError::ExternalFailure(format!("failed to watch {}: {e}", root_path.display())))?;
        watchers.push(watcher);
    }

    tokio::spawn(async move {
        // Keep the watcher handles alive for the life of this task; they
        // stop delivering events as soon as they're dropped.
        let _watchers = watchers;
        let last_seen: Mutex<HashMap<PathBuf, Instant>> = Mutex::new(HashMap::new());

        while let Some((path, kind)) = rx.recv().await {
            {
                let mut seen = last_seen.lock().await;
                if let Some(prev) = seen.get(&path) {
                    if prev.elapsed() < debounce {
                        continue;
                    }
                }
                seen.insert(path.clone(), Instant::now());
            }

            let Some((root_path, root_id)) = root_paths.iter().find(|(r, _)| path.starts_with(r)) else {
                continue;
            };

            match kind {
                EventKind::Create(_) => {
                    if !walker::has_supported_extension(&path, &orchestrator.scan_config().supported_extensions) {
                        continue;
                    }
                    let result = if walker::looks_like_extras_path(root_path, &path) {
                        orchestrator.ingest_extra(root_path, &path).await
                    } else {
                        orchestrator
                            .ingest_file(crate::ids::StorageRootId(*root_id), root_path, &path)
                            .await
                            .map(|_| ())
                    };
                    match result {
                        Ok(_) => info!(path = %path.display(), "watcher ingested new file"),
                        Err(e) => warn!(path = %path.display(), error = %e, "watcher ingest failed"),
                    }
                }
                EventKind::Remove(_) => {
                    info!(path = %path.display(), "file removed; catalog entry kept (no delete-on-watch)");
                }
                EventKind::Modify(notify::event::ModifyKind::Name(_)) => {
                    debug!(path = %path.display(), "file renamed; next full scan will pick up the new path");
                }
                _ => {}
            }
        }
    });

    Ok(())
}
