//! Technical Probe (C2): invokes the external probe binary (`ffprobe`)
//! with JSON output and extracts the technical fields spec §4.2 names.
//!
//! Deliberately a subprocess, not an in-process library binding — spec §1
//! delegates "all A/V work... to an external encoder binary" and §4.2
//! describes "invoking the external probe binary with JSON output".
//! Grounded on the `ffprobe`-subprocess/JSON-parse idiom in
//! `dog4ik-media-server::library.rs`'s `run_command`/`FFprobeOutput`
//! shape, adapted to `tokio::process::Command`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::store::models::{AudioTrack, SubtitleTrack};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalMetadata {
    pub duration_seconds: i64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub audio_tracks: Vec<AudioTrack>,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    #[serde(default)]
    format: FFprobeFormat,
    #[serde(default)]
    streams: Vec<FFprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FFprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    #[serde(default)]
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    channels: Option<u32>,
    #[serde(default)]
    disposition: Option<FFprobeDisposition>,
    #[serde(default)]
    tags: Option<FFprobeTags>,
}

#[derive(Debug, Default, Deserialize)]
struct FFprobeDisposition {
    #[serde(default)]
    forced: i32,
}

#[derive(Debug, Default, Deserialize)]
struct FFprobeTags {
    language: Option<String>,
    title: Option<String>,
}

/// Invokes `ffprobe -print_format json -show_format -show_streams` on
/// `path` and parses the result into `TechnicalMetadata`.
///
/// Returns `ExternalFailure` if the binary exits non-zero or emits
/// non-JSON; callers then store technical fields as empty and continue
/// (spec §4.2, §7 propagation rule: ingest swallows this, playback
/// surfaces it).
pub async fn probe(path: &Path) -> Result<TechnicalMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| AppError::ExternalFailure(format!("failed to spawn ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(AppError::ExternalFailure(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let parsed: FFprobeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| AppError::ExternalFailure(format!("ffprobe emitted non-JSON: {e}")))?;

    Ok(to_technical_metadata(parsed))
}

fn to_technical_metadata(parsed: FFprobeOutput) -> TechnicalMetadata {
    let duration_seconds = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .map(|d| d as i64)
        .unwrap_or(0);

    let mut video_codec = None;
    let mut resolution = None;
    let mut audio_codec = None;
    let mut audio_tracks = Vec::new();
    let mut subtitle_tracks = Vec::new();
    let mut audio_idx = 0usize;
    let mut subtitle_idx = 0usize;

    for stream in parsed.streams {
        match stream.codec_type.as_deref() {
            Some("video") if video_codec.is_none() => {
                video_codec = stream.codec_name.clone();
                if let (Some(w), Some(h)) = (stream.width, stream.height) {
                    resolution = Some(format!("{w}x{h}"));
                }
            }
            Some("audio") => {
                if audio_codec.is_none() {
                    audio_codec = stream.codec_name.clone();
                }
                audio_tracks.push(AudioTrack {
                    index: audio_idx,
                    language: stream
                        .tags
                        .as_ref()
                        .and_then(|t| t.language.clone())
                        .unwrap_or_else(|| "und".to_string()),
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    channels: stream.channels.unwrap_or(0),
                    title: stream.tags.as_ref().and_then(|t| t.title.clone()),
                });
                audio_idx += 1;
            }
            Some("subtitle") => {
                subtitle_tracks.push(SubtitleTrack {
                    index: subtitle_idx,
                    language: stream
                        .tags
                        .as_ref()
                        .and_then(|t| t.language.clone())
                        .unwrap_or_else(|| "und".to_string()),
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    title: stream.tags.as_ref().and_then(|t| t.title.clone()),
                    forced: stream.disposition.map(|d| d.forced != 0).unwrap_or(false),
                });
                subtitle_idx += 1;
            }
            _ => {}
        }
    }

    TechnicalMetadata {
        duration_seconds,
        video_codec,
        audio_codec,
        resolution,
        audio_tracks,
        subtitle_tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_codecs_and_tracks() {
        let json = r#"{
            "format": {"duration": "7200.500000"},
            "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080},
                {"index": 1, "codec_type": "audio", "codec_name": "aac", "channels": 6,
                 "tags": {"language": "eng", "title": "Surround"}},
                {"index": 2, "codec_type": "subtitle", "codec_name": "subrip",
                 "tags": {"language": "fre"}, "disposition": {"forced": 1}}
            ]
        }"#;
        let parsed: FFprobeOutput = serde_json::from_str(json).unwrap();
        let meta = to_technical_metadata(parsed);

        assert_eq!(meta.duration_seconds, 7200);
        assert_eq!(meta.video_codec.as_deref(), Some("h264"));
        assert_eq!(meta.resolution.as_deref(), Some("1920x1080"));
        assert_eq!(meta.audio_codec.as_deref(), Some("aac"));
        assert_eq!(meta.audio_tracks.len(), 1);
        assert_eq!(meta.audio_tracks[0].language, "eng");
        assert_eq!(meta.subtitle_tracks.len(), 1);
        assert!(meta.subtitle_tracks[0].forced);
    }

    #[test]
    fn missing_streams_yield_empty_metadata() {
        let parsed: FFprobeOutput = serde_json::from_str(r#"{"format": {}, "streams": []}"#).unwrap();
        let meta = to_technical_metadata(parsed);
        assert_eq!(meta.duration_seconds, 0);
        assert!(meta.video_codec.is_none());
        assert!(meta.audio_tracks.is_empty());
    }
}
