//! Extras Linker (C6): fuzzy-matches a bonus-content file to the parent
//! catalog entry it belongs with (spec §4.6).
//!
//! Unlinked extras are not an error — they still get catalogued, just
//! without a `movie_id`/`tv_show_id`/`episode_id` to roll up under.

use std::path::Path;

use crate::error::Result;
use crate::ids::ShowId;
use crate::parser::ParsedName;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Tv,
    Movie,
}

/// Resolved links for one extras file. All fields `None` means the file
/// is catalogued standalone.
#[derive(Debug, Clone, Default)]
pub struct ExtraLinks {
    pub movie_id: Option<i64>,
    pub tv_show_id: Option<i64>,
    pub episode_id: Option<i64>,
}

const STRIP_SUFFIXES: &[&str] = &[
    " commentary",
    " special features",
    " extras",
    " behind the scenes",
    " bonus content",
    " deleted scenes",
];

fn classify_context(relative_path: &Path, parsed: &ParsedName) -> Context {
    let lower = relative_path.to_string_lossy().to_lowercase();
    if lower.contains("tv") || lower.contains("show") || lower.contains("series") {
        return Context::Tv;
    }
    if lower.contains("movie") || lower.contains("film") {
        return Context::Movie;
    }
    // Fallback: a parseable S/E marker implies TV (spec §4.6 "fallback
    // uses the parseable S/E markers").
    if parsed.season.is_some() && parsed.episode.is_some() {
        Context::Tv
    } else {
        Context::Movie
    }
}

/// First path segment below `root`, e.g. for `root/Inception (2010)/Com...mp4`
/// this is `"Inception (2010)"` (spec §4.6 "parent directory name").
fn parent_dir_name(root: &Path, file_path: &Path) -> Option<String> {
    let relative = file_path.strip_prefix(root).ok()?;
    relative
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
}

fn strip_known_suffixes(candidate: &str) -> String {
    let lower = candidate.to_lowercase();
    for suffix in STRIP_SUFFIXES {
        if lower.ends_with(suffix) {
            return candidate[..candidate.len() - suffix.len()].trim().to_string();
        }
    }
    candidate.trim().to_string()
}

fn strip_parenthetical_year(candidate: &str) -> Option<String> {
    let open = candidate.rfind('(')?;
    let close = candidate[open..].find(')')? + open;
    let inner = candidate[open + 1..close].trim();
    if inner.len() == 4 && inner.chars().all(|c| c.is_ascii_digit()) {
        let mut stripped = candidate[..open].to_string();
        stripped.push_str(&candidate[close + 1..]);
        Some(stripped.trim().to_string())
    } else {
        None
    }
}

/// Links one extras file against the catalog, given the storage root it
/// lives under and the extras-pass parse result for its filename.
pub async fn link(
    store: &Store,
    root: &Path,
    file_path: &Path,
    parsed: &ParsedName,
) -> Result<ExtraLinks> {
    let Some(raw_candidate) = parent_dir_name(root, file_path) else {
        return Ok(ExtraLinks::default());
    };
    let candidate = strip_known_suffixes(&raw_candidate);
    let context = classify_context(file_path, parsed);

    match context {
        Context::Tv => link_tv(store, &candidate, parsed).await,
        Context::Movie => link_movie(store, &candidate).await,
    }
}

async fn link_movie(store: &Store, candidate: &str) -> Result<ExtraLinks> {
    if let Some(movie) = store.find_movie_by_title(candidate).await? {
        return Ok(ExtraLinks {
            movie_id: Some(movie.id),
            ..Default::default()
        });
    }
    if let Some(stripped) = strip_parenthetical_year(candidate) {
        if let Some(movie) = store.find_movie_by_title(&stripped).await? {
            return Ok(ExtraLinks {
                movie_id: Some(movie.id),
                ..Default::default()
            });
        }
    }
    let fuzzy = store.fuzzy_search_movies(candidate).await?;
    Ok(ExtraLinks {
        movie_id: fuzzy.into_iter().next().map(|m| m.id),
        ..Default::default()
    })
}

async fn link_tv(store: &Store, candidate: &str, parsed: &ParsedName) -> Result<ExtraLinks> {
    let show = match store.find_show(candidate, None).await? {
        Some(show) => Some(show),
        None => match strip_parenthetical_year(candidate) {
            Some(stripped) => store.find_show(&stripped, None).await?,
            None => None,
        },
    };
    let show = match show {
        Some(s) => Some(s),
        None => store.fuzzy_search_shows(candidate).await?.into_iter().next(),
    };

    let Some(show) = show else {
        return Ok(ExtraLinks::default());
    };

    let mut links = ExtraLinks {
        tv_show_id: Some(show.id),
        ..Default::default()
    };

    if let (Some(season), Some(episode)) = (parsed.season, parsed.episode) {
        if let Some(ep) = store
            .find_episode(ShowId(show.id), season, episode)
            .await?
        {
            links.episode_id = Some(ep.id);
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parent_dir_name_takes_first_segment_below_root() {
        let root = PathBuf::from("/media/movies");
        let file = PathBuf::from("/media/movies/Inception (2010)/Com - Director.mp4");
        assert_eq!(
            parent_dir_name(&root, &file),
            Some("Inception (2010)".to_string())
        );
    }

    #[test]
    fn strip_known_suffixes_removes_trailing_phrase() {
        assert_eq!(
            strip_known_suffixes("Breaking Bad Special Features"),
            "Breaking Bad"
        );
        assert_eq!(strip_known_suffixes("Plain Title"), "Plain Title");
    }

    #[test]
    fn strip_parenthetical_year_extracts_bare_title() {
        assert_eq!(
            strip_parenthetical_year("Inception (2010)"),
            Some("Inception".to_string())
        );
        assert_eq!(strip_parenthetical_year("No Year Here"), None);
    }

    #[test]
    fn classify_context_detects_tv_from_path_segment() {
        let parsed = ParsedName::default();
        assert_eq!(
            classify_context(Path::new("/media/tv/Breaking Bad/extra.mp4"), &parsed),
            Context::Tv
        );
        assert_eq!(
            classify_context(Path::new("/media/movies/Inception/extra.mp4"), &parsed),
            Context::Movie
        );
    }

    #[test]
    fn classify_context_falls_back_to_episode_marker() {
        let mut parsed = ParsedName::default();
        parsed.season = Some(1);
        parsed.episode = Some(3);
        assert_eq!(
            classify_context(Path::new("/media/unlabeled/Show/extra.mp4"), &parsed),
            Context::Tv
        );
    }
}
