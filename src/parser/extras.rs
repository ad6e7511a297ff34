//! Extras classification (spec §4.1, second pass): keyed by directory
//! context and leading token rather than the movie/episode heuristics
//! above. Shares the season/episode capture with the main parser when a
//! commentary or deleted-scene filename also carries an `S<dd>E<dd>` pair.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraCategory {
    Commentary,
    DeletedScene,
    Featurette,
    Interview,
    GagReel,
    MusicVideo,
    BehindTheScenes,
    Other,
}

impl ExtraCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtraCategory::Commentary => "commentary",
            ExtraCategory::DeletedScene => "deleted-scene",
            ExtraCategory::Featurette => "featurette",
            ExtraCategory::Interview => "interview",
            ExtraCategory::GagReel => "gag-reel",
            ExtraCategory::MusicVideo => "music-video",
            ExtraCategory::BehindTheScenes => "behind-the-scenes",
            ExtraCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for ExtraCategory {
    type Err = crate::error::AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "commentary" => ExtraCategory::Commentary,
            "deleted-scene" => ExtraCategory::DeletedScene,
            "featurette" => ExtraCategory::Featurette,
            "interview" => ExtraCategory::Interview,
            "gag-reel" => ExtraCategory::GagReel,
            "music-video" => ExtraCategory::MusicVideo,
            "behind-the-scenes" => ExtraCategory::BehindTheScenes,
            "other" => ExtraCategory::Other,
            other => {
                return Err(crate::error::AppError::validation(
                    "category",
                    format!("unknown extras category: {other}"),
                ))
            }
        })
    }
}

static BLOOPER: OnceLock<Regex> = OnceLock::new();
static INTERVIEW: OnceLock<Regex> = OnceLock::new();
static BEHIND: OnceLock<Regex> = OnceLock::new();
static FEATURETTE: OnceLock<Regex> = OnceLock::new();

fn matches(cell: &'static OnceLock<Regex>, pattern: &str, stem: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).unwrap()).is_match(stem)
}

/// Classifies a single extras filename. `stem` is the file stem (no
/// directory, no extension); callers pass directory context separately
/// since the spec's directory heuristic (tv/show/series vs movie/film) is
/// resolved by the extras linker (C6), not here.
pub fn classify_extra(stem: &str) -> ExtraCategory {
    let lower = stem.to_lowercase();

    if lower.starts_with("com") {
        return ExtraCategory::Commentary;
    }
    if lower.starts_with("ds") {
        return ExtraCategory::DeletedScene;
    }
    if matches(&BLOOPER, r"(?i)blooper|gag|outtake", &lower) {
        return ExtraCategory::GagReel;
    }
    if matches(&INTERVIEW, r"(?i)interview", &lower) {
        return ExtraCategory::Interview;
    }
    if matches(&BEHIND, r"(?i)making-of|behind|bts", &lower) {
        return ExtraCategory::BehindTheScenes;
    }
    if matches(&FEATURETTE, r"(?i)featurette|epk|special feature", &lower) {
        return ExtraCategory::Featurette;
    }
    ExtraCategory::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn com_prefix_is_commentary() {
        assert_eq!(classify_extra("ComS01E07 - Pilot"), ExtraCategory::Commentary);
    }

    #[test]
    fn ds_prefix_is_deleted_scene() {
        assert_eq!(classify_extra("DS01 - Cut Ending"), ExtraCategory::DeletedScene);
    }

    #[test]
    fn blooper_keyword_is_gag_reel() {
        assert_eq!(classify_extra("Season 1 Bloopers"), ExtraCategory::GagReel);
    }

    #[test]
    fn unmatched_falls_back_to_other() {
        assert_eq!(classify_extra("Random Clip"), ExtraCategory::Other);
    }

    #[test]
    fn category_round_trips_through_str() {
        use std::str::FromStr;
        for cat in [
            ExtraCategory::Commentary,
            ExtraCategory::DeletedScene,
            ExtraCategory::Featurette,
            ExtraCategory::Interview,
            ExtraCategory::GagReel,
            ExtraCategory::MusicVideo,
            ExtraCategory::BehindTheScenes,
            ExtraCategory::Other,
        ] {
            assert_eq!(ExtraCategory::from_str(cat.as_str()).unwrap(), cat);
        }
    }
}
