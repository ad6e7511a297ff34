//! Metadata Enricher (C3): search then detail against an external
//! metadata provider, coalescing results into catalog fields (spec §4.3).
//!
//! Failures are non-fatal — callers leave enrichment fields empty and
//! keep cataloguing (spec §7 "ExternalFailure... non-fatal in ingest").
//! The provider is a trait so the ingest pipeline (C5) never depends on
//! a concrete HTTP client, mirroring the `MetadataService` trait shape in
//! `Beam::services::metadata.rs`.

mod tmdb;

pub use tmdb::TmdbProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCandidate {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDetails {
    pub external_id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<i32>,
    pub genres: Vec<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowCandidate {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowDetails {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_ref: Option<String>,
    pub backdrop_ref: Option<String>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub imdb_id: Option<String>,
}

/// Search + detail contract, implemented once per provider (spec §4.3
/// names only one: TMDB-shaped). Both movie and show lookups share the
/// same "search then take the first candidate, then fetch details"
/// pattern.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Option<Vec<MovieCandidate>>;
    async fn movie_details(&self, external_id: &str) -> Option<MovieDetails>;
    async fn search_show(&self, title: &str, year: Option<i32>) -> Option<Vec<ShowCandidate>>;
    async fn show_details(&self, external_id: &str) -> Option<ShowDetails>;
}

/// Resolves a movie's enrichment fields by searching then detailing,
/// taking the first candidate when any are returned (spec §4.3).
/// Failures anywhere in the chain return `None`; the caller keeps the
/// heuristic (parsed) fields.
pub async fn enrich_movie(
    provider: &dyn MetadataProvider,
    title: &str,
    year: Option<i32>,
) -> Option<MovieDetails> {
    let candidates = provider.search_movie(title, year).await?;
    let first = candidates.into_iter().next()?;
    provider.movie_details(&first.external_id).await
}

/// Same contract for shows (spec §4.3 "For a show: same contract").
pub async fn enrich_show(
    provider: &dyn MetadataProvider,
    title: &str,
    year: Option<i32>,
) -> Option<ShowDetails> {
    let candidates = provider.search_show(title, year).await?;
    let first = candidates.into_iter().next()?;
    provider.show_details(&first.external_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        movie: Option<MovieDetails>,
    }

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        async fn search_movie(&self, _title: &str, _year: Option<i32>) -> Option<Vec<MovieCandidate>> {
            self.movie.as_ref().map(|m| {
                vec![MovieCandidate {
                    external_id: m.external_id.clone(),
                    title: m.title.clone(),
                    year: m.year,
                }]
            })
        }
        async fn movie_details(&self, _external_id: &str) -> Option<MovieDetails> {
            self.movie.clone()
        }
        async fn search_show(&self, _title: &str, _year: Option<i32>) -> Option<Vec<ShowCandidate>> {
            None
        }
        async fn show_details(&self, _external_id: &str) -> Option<ShowDetails> {
            None
        }
    }

    #[tokio::test]
    async fn enrich_movie_takes_first_candidate_details() {
        let provider = FakeProvider {
            movie: Some(MovieDetails {
                external_id: "603".into(),
                title: "The Matrix".into(),
                year: Some(1999),
                ..Default::default()
            }),
        };
        let details = enrich_movie(&provider, "The Matrix", Some(1999)).await.unwrap();
        assert_eq!(details.title, "The Matrix");
    }

    #[tokio::test]
    async fn enrich_movie_returns_none_on_no_candidates() {
        let provider = FakeProvider { movie: None };
        assert!(enrich_movie(&provider, "Unknown Film", None).await.is_none());
    }
}
