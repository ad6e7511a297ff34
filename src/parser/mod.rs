//! Filename Parser (C1): a pure function from path to classification.
//! Never fails — worst case falls back to `kind=movie, title=base name`
//! (spec §4.1).

mod extras;
mod quality;
mod title;

pub use extras::{classify_extra, ExtraCategory};

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedKind {
    Movie,
    Episode,
    Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub kind: Option<ParsedKind>,
    pub title: String,
    pub year: Option<i32>,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub imdb_id: Option<String>,
    pub category: Option<ExtraCategory>,
}

impl Default for ParsedKind {
    fn default() -> Self {
        ParsedKind::Movie
    }
}

static EPISODE_SXXEXX: OnceLock<Regex> = OnceLock::new();
static EPISODE_NXNN: OnceLock<Regex> = OnceLock::new();
static IMDB_ID: OnceLock<Regex> = OnceLock::new();
static YEAR: OnceLock<Regex> = OnceLock::new();

/// Parses a single path into its catalog classification. `path` may be a
/// bare filename or a full path; only the file stem is considered.
pub fn parse(path: &Path) -> ParsedName {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut imdb_id = None;
    if let Some(caps) = regex(&IMDB_ID, r"(?i)(tt\d{7,9})").captures(&stem) {
        imdb_id = Some(caps[1].to_lowercase());
    }

    // Rule 1: episode marker, first match wins.
    if let Some(caps) = regex(&EPISODE_SXXEXX, r"(?i)s(\d{1,2})e(\d{1,3})").captures(&stem) {
        let season: i32 = caps[1].parse().unwrap_or(0);
        let episode: i32 = caps[2].parse().unwrap_or(0);
        let before = &stem[..caps.get(0).unwrap().start()];
        return ParsedName {
            kind: Some(ParsedKind::Episode),
            title: title::normalize(before, true),
            year: None,
            season: Some(season),
            episode: Some(episode),
            imdb_id,
            category: None,
        };
    }
    if let Some(caps) = regex(&EPISODE_NXNN, r"(?i)(\d{1,2})x(\d{2,3})").captures(&stem) {
        let season: i32 = caps[1].parse().unwrap_or(0);
        let episode: i32 = caps[2].parse().unwrap_or(0);
        let before = &stem[..caps.get(0).unwrap().start()];
        return ParsedName {
            kind: Some(ParsedKind::Episode),
            title: title::normalize(before, true),
            year: None,
            season: Some(season),
            episode: Some(episode),
            imdb_id,
            category: None,
        };
    }

    // Movie: extract year, strip quality tokens before separator
    // normalization so e.g. "1080p" never leaks as a year candidate.
    let without_quality = quality::strip_quality_tokens(&stem);
    let padded = format!(" {without_quality} ");

    // A title can itself contain a leading year ("2001: A Space Odyssey"),
    // so the leftmost plausible year isn't necessarily the release year.
    // Walk candidates from last to first and take the first one that still
    // leaves a non-empty title behind it; this prefers the release year at
    // the end of the filename while falling back to an earlier one rather
    // than emptying the title out entirely.
    let mut year = None;
    let mut title_source: &str = &without_quality;
    let candidates: Vec<_> = regex(&YEAR, r"[\(\[\.\s_-](19\d{2}|20\d{2})[\)\]\.\s_-]")
        .captures_iter(&padded)
        .collect();
    for cap in candidates.into_iter().rev() {
        let Ok(candidate_year) = cap[1].parse::<i32>() else {
            continue;
        };
        if !(1900..=2099).contains(&candidate_year) {
            continue;
        }
        let start_in_padded = cap.get(1).unwrap().start();
        let idx = start_in_padded.saturating_sub(1).min(without_quality.len());
        let candidate_source = &without_quality[..idx];
        if !candidate_source.trim_matches(|c: char| ".-_ ".contains(c)).is_empty() {
            year = Some(candidate_year);
            title_source = candidate_source;
            break;
        }
    }

    ParsedName {
        kind: Some(ParsedKind::Movie),
        title: title::normalize(title_source, false),
        year,
        season: None,
        episode: None,
        imdb_id,
        category: None,
    }
}

/// Second pass for extras files (spec §4.1): classifies `category` from
/// the leading token/keywords and, when an `S<dd>E<dd>` pair is also
/// present (e.g. a per-episode commentary track), populates season and
/// episode the same way the main parser would.
pub fn parse_extra(path: &Path) -> ParsedName {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let category = classify_extra(&stem);

    if let Some(caps) = regex(&EPISODE_SXXEXX, r"(?i)s(\d{1,2})e(\d{1,3})").captures(&stem) {
        let season: i32 = caps[1].parse().unwrap_or(0);
        let episode: i32 = caps[2].parse().unwrap_or(0);
        let before = &stem[..caps.get(0).unwrap().start()];
        return ParsedName {
            kind: Some(ParsedKind::Extra),
            title: title::normalize(before, false),
            year: None,
            season: Some(season),
            episode: Some(episode),
            imdb_id: None,
            category: Some(category),
        };
    }

    ParsedName {
        kind: Some(ParsedKind::Extra),
        title: title::normalize(&stem, false),
        year: None,
        season: None,
        episode: None,
        imdb_id: None,
        category: Some(category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extra_with_episode_marker_captures_season_episode() {
        let p = parse_extra(&PathBuf::from("ComS01E07 - Title.m4v"));
        assert_eq!(p.kind, Some(ParsedKind::Extra));
        assert_eq!(p.category, Some(ExtraCategory::Commentary));
        assert_eq!(p.season, Some(1));
        assert_eq!(p.episode, Some(7));
    }

    #[test]
    fn matrix_parses_as_movie() {
        let p = parse(&PathBuf::from("The.Matrix.1999.1080p.BluRay.x264.mp4"));
        assert_eq!(p.kind, Some(ParsedKind::Movie));
        assert_eq!(p.title, "The Matrix");
        assert_eq!(p.year, Some(1999));
    }

    #[test]
    fn breaking_bad_parses_as_episode() {
        let p = parse(&PathBuf::from("Breaking.Bad.S01E07.720p.mkv"));
        assert_eq!(p.kind, Some(ParsedKind::Episode));
        assert_eq!(p.title, "Breaking Bad");
        assert_eq!(p.season, Some(1));
        assert_eq!(p.episode, Some(7));
    }

    #[test]
    fn leading_year_title_keeps_year_out_of_title() {
        let p = parse(&PathBuf::from("2001.A.Space.Odyssey.1968.mp4"));
        assert_eq!(p.kind, Some(ParsedKind::Movie));
        assert_eq!(p.title, "2001 a Space Odyssey");
        assert_eq!(p.year, Some(1968));
    }

    #[test]
    fn quality_token_never_leaks_as_year() {
        let p = parse(&PathBuf::from("Some.Movie.1080p.mp4"));
        assert_eq!(p.year, None);
    }

    #[test]
    fn never_fails_on_garbage_input() {
        let p = parse(&PathBuf::from("____...---.mp4"));
        assert_eq!(p.kind, Some(ParsedKind::Movie));
    }
}
