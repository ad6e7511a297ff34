//! Embedded-subtitle extraction side-channel (spec §4.9): pulls one
//! subtitle stream out of the source file and converts it to WebVTT so it
//! can be served alongside a transcode session without re-muxing video.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{AppError, Result};

/// Extracts the subtitle stream at absolute ffprobe stream `index` from
/// `source` into a standalone `.vtt` file at `output_path`.
pub async fn extract_vtt(source: &Path, stream_index: usize, output_path: &Path) -> Result<()> {
    let status = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "warning"])
        .arg("-i")
        .arg(source)
        .arg("-map")
        .arg(format!("0:{stream_index}"))
        .arg(output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| AppError::ExternalFailure(format!("failed to spawn ffmpeg: {e}")))?;

    if !status.status.success() {
        return Err(AppError::ExternalFailure(format!(
            "subtitle extraction exited with {}: {}",
            status.status,
            String::from_utf8_lossy(&status.stderr)
        )));
    }
    Ok(())
}
