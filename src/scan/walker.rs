//! Recursive directory walk over one storage root, filtered to the
//! configured set of playable extensions (spec §4.5 step 1).

use std::path::{Path, PathBuf};

use crate::error::Result;

pub async fn walk_supported_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(_) => continue,
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() && has_supported_extension(&path, extensions) {
                out.push(path);
            }
        }
    }
    Ok(out)
}

pub fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

const EXTRAS_MARKERS: &[&str] = &[
    "extra",
    "special feature",
    "behind the scenes",
    "bonus",
    "deleted scene",
    "featurette",
    "commentary",
    "blooper",
    "gag reel",
    "interview",
];

/// Whether any path component below the root hints this file is bonus
/// content rather than a main feature (spec §4.6 "a root whose name or
/// context suggests extras").
pub fn looks_like_extras_path(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let lowered = relative.to_string_lossy().to_lowercase();
    EXTRAS_MARKERS.iter().any(|m| lowered.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        let exts = vec!["mp4".to_string(), "mkv".to_string()];
        assert!(has_supported_extension(Path::new("a/b/Movie.MP4"), &exts));
        assert!(!has_supported_extension(Path::new("a/b/movie.avi"), &exts));
    }

    #[test]
    fn extras_marker_detected_in_directory_name() {
        let root = Path::new("/media/movies");
        assert!(looks_like_extras_path(
            root,
            Path::new("/media/movies/Inception (2010)/Special Features/Com.mp4")
        ));
        assert!(!looks_like_extras_path(
            root,
            Path::new("/media/movies/Inception (2010)/Inception.mp4")
        ));
    }
}
