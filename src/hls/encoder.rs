//! Encoder argument construction (spec §4.8 "Encoder arguments: design
//! contract, not a command line"): builds the `ffmpeg` argv for one live
//! transcode session, hardware-acceleration aware.

use std::path::Path;

use crate::config::HwAccel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    P720,
    P1080,
}

impl Profile {
    pub fn for_source_height(height: Option<u32>) -> Self {
        match height {
            Some(h) if h <= 720 => Profile::P720,
            _ => Profile::P1080,
        }
    }

    fn scale(self) -> &'static str {
        match self {
            Profile::P720 => "1280x720",
            Profile::P1080 => "1920x1080",
        }
    }

    fn video_bitrate(self) -> &'static str {
        match self {
            Profile::P720 => "2800k",
            Profile::P1080 => "5000k",
        }
    }

    fn audio_bitrate(self) -> &'static str {
        "128k"
    }
}

struct HwProfile {
    /// Flags placed before `-i` (e.g. `-hwaccel cuda`).
    input_flags: Vec<String>,
    /// Output video codec name (e.g. `h264_nvenc`).
    video_codec: &'static str,
    /// Scale filter name used in a `-vf`/`-filter:v` chain.
    scale_filter: &'static str,
}

fn hw_profile(hw: HwAccel) -> HwProfile {
    match hw {
        HwAccel::None => HwProfile {
            input_flags: vec![],
            video_codec: "libx264",
            scale_filter: "scale",
        },
        HwAccel::Videotoolbox => HwProfile {
            input_flags: vec!["-hwaccel".into(), "videotoolbox".into()],
            video_codec: "h264_videotoolbox",
            scale_filter: "scale",
        },
        HwAccel::Cuda => HwProfile {
            input_flags: vec!["-hwaccel".into(), "cuda".into()],
            video_codec: "h264_nvenc",
            scale_filter: "scale_cuda",
        },
        HwAccel::Vaapi => HwProfile {
            input_flags: vec![
                "-hwaccel".into(),
                "vaapi".into(),
                "-hwaccel_output_format".into(),
                "vaapi".into(),
            ],
            video_codec: "h264_vaapi",
            scale_filter: "scale_vaapi",
        },
        HwAccel::Qsv => HwProfile {
            input_flags: vec!["-hwaccel".into(), "qsv".into()],
            video_codec: "h264_qsv",
            scale_filter: "scale_qsv",
        },
    }
}

/// Builds the full `ffmpeg` argument vector for one HLS transcode session
/// (spec §4.8). `output_dir` already exists; segments land at
/// `<output_dir>/segment%d.ts`, the manifest at `<output_dir>/manifest.m3u8`.
pub fn build_args(
    source: &Path,
    output_dir: &Path,
    profile: Profile,
    hw: HwAccel,
    software_preset: &str,
    segment_target_secs: u32,
) -> Vec<String> {
    let hwp = hw_profile(hw);
    let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "warning".into()];
    args.extend(hwp.input_flags.clone());
    args.push("-i".into());
    args.push(source.to_string_lossy().into_owned());

    args.push("-c:v".into());
    args.push(hwp.video_codec.into());
    args.push("-vf".into());
    args.push(format!("{}={}", hwp.scale_filter, profile.scale().replace('x', ":")));
    args.push("-b:v".into());
    args.push(profile.video_bitrate().into());
    if matches!(hw, HwAccel::None) {
        args.push("-preset".into());
        args.push(software_preset.into());
    }

    args.push("-c:a".into());
    args.push("aac".into());
    args.push("-ac".into());
    args.push("2".into());
    args.push("-b:a".into());
    args.push(profile.audio_bitrate().into());

    args.push("-f".into());
    args.push("hls".into());
    args.push("-hls_time".into());
    args.push(segment_target_secs.to_string());
    args.push("-hls_list_size".into());
    args.push("0".into());
    args.push("-hls_flags".into());
    args.push("independent_segments+append_list".into());
    args.push("-hls_segment_type".into());
    args.push("mpegts".into());
    args.push("-hls_segment_filename".into());
    args.push(
        output_dir
            .join("segment%d.ts")
            .to_string_lossy()
            .into_owned(),
    );
    args.push(output_dir.join("manifest.m3u8").to_string_lossy().into_owned());

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn profile_selection_by_source_height() {
        assert_eq!(Profile::for_source_height(Some(480)), Profile::P720);
        assert_eq!(Profile::for_source_height(Some(720)), Profile::P720);
        assert_eq!(Profile::for_source_height(Some(1080)), Profile::P1080);
        assert_eq!(Profile::for_source_height(None), Profile::P1080);
    }

    #[test]
    fn software_path_includes_preset_flag() {
        let args = build_args(
            &PathBuf::from("/media/movie.mkv"),
            &PathBuf::from("/transcode/42"),
            Profile::P1080,
            HwAccel::None,
            "veryfast",
            4,
        );
        assert!(args.iter().any(|a| a == "libx264"));
        assert!(args.iter().any(|a| a == "-preset"));
        assert!(args.iter().any(|a| a == "veryfast"));
    }

    #[test]
    fn hardware_path_skips_software_preset() {
        let args = build_args(
            &PathBuf::from("/media/movie.mkv"),
            &PathBuf::from("/transcode/42"),
            Profile::P720,
            HwAccel::Cuda,
            "veryfast",
            4,
        );
        assert!(args.iter().any(|a| a == "h264_nvenc"));
        assert!(!args.iter().any(|a| a == "-preset"));
        assert!(args.iter().any(|a| a == "-hwaccel"));
    }

    #[test]
    fn segment_filename_is_keyed_under_output_dir() {
        let args = build_args(
            &PathBuf::from("/media/movie.mkv"),
            &PathBuf::from("/transcode/42"),
            Profile::P1080,
            HwAccel::None,
            "veryfast",
            4,
        );
        assert!(args
            .iter()
            .any(|a| a.contains("/transcode/42/segment%d.ts")));
    }
}
