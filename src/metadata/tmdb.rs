//! TMDB-compatible HTTP implementation of `MetadataProvider`. Errors
//! (network, non-2xx, malformed JSON) are swallowed to `None` at every
//! call site — enrichment is always best-effort (spec §4.3, §7).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{MetadataProvider, MovieCandidate, MovieDetails, ShowCandidate, ShowDetails};
use crate::config::MetadataConfig;

pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbProvider {
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, String)]) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url).query(query);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, url, "metadata provider request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), url, "metadata provider returned non-success");
            return None;
        }
        match resp.json::<T>().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, url, "metadata provider returned malformed JSON");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieSearchResult {
    id: i64,
    title: String,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowSearchResult {
    id: i64,
    name: String,
    #[serde(default)]
    first_air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MovieDetailResponse {
    id: i64,
    title: String,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    runtime: Option<i32>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowDetailResponse {
    id: i64,
    name: String,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

fn year_from_date(date: &Option<String>) -> Option<i32> {
    date.as_deref()
        .and_then(|d| d.get(0..4))
        .and_then(|y| y.parse().ok())
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Option<Vec<MovieCandidate>> {
        let mut query = vec![("query", title.to_string())];
        if let Some(y) = year {
            query.push(("year", y.to_string()));
        }
        let resp: SearchResponse<MovieSearchResult> =
            self.get("/search/movie", &query).await?;
        Some(
            resp.results
                .into_iter()
                .map(|r| MovieCandidate {
                    external_id: r.id.to_string(),
                    title: r.title,
                    year: year_from_date(&r.release_date),
                })
                .collect(),
        )
    }

    async fn movie_details(&self, external_id: &str) -> Option<MovieDetails> {
        let resp: MovieDetailResponse = self.get(&format!("/movie/{external_id}"), &[]).await?;
        Some(MovieDetails {
            external_id: resp.id.to_string(),
            title: resp.title,
            original_title: resp.original_title,
            year: year_from_date(&resp.release_date),
            overview: resp.overview,
            poster_ref: resp.poster_path,
            backdrop_ref: resp.backdrop_path,
            rating: resp.vote_average,
            runtime_minutes: resp.runtime,
            genres: resp.genres.into_iter().map(|g| g.name).collect(),
            imdb_id: resp.imdb_id,
        })
    }

    async fn search_show(&self, title: &str, year: Option<i32>) -> Option<Vec<ShowCandidate>> {
        let mut query = vec![("query", title.to_string())];
        if let Some(y) = year {
            query.push(("first_air_date_year", y.to_string()));
        }
        let resp: SearchResponse<ShowSearchResult> = self.get("/search/tv", &query).await?;
        Some(
            resp.results
                .into_iter()
                .map(|r| ShowCandidate {
                    external_id: r.id.to_string(),
                    title: r.name,
                    year: year_from_date(&r.first_air_date),
                })
                .collect(),
        )
    }

    async fn show_details(&self, external_id: &str) -> Option<ShowDetails> {
        let resp: ShowDetailResponse = self
            .get(&format!("/tv/{external_id}"), &[("append_to_response", "external_ids".to_string())])
            .await?;
        Some(ShowDetails {
            external_id: resp.id.to_string(),
            title: resp.name,
            year: year_from_date(&resp.first_air_date),
            overview: resp.overview,
            poster_ref: resp.poster_path,
            backdrop_ref: resp.backdrop_path,
            rating: resp.vote_average,
            genres: resp.genres.into_iter().map(|g| g.name).collect(),
            imdb_id: resp.external_ids.and_then(|e| e.imdb_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_from_date_extracts_prefix() {
        assert_eq!(year_from_date(&Some("1999-03-31".to_string())), Some(1999));
        assert_eq!(year_from_date(&None), None);
        assert_eq!(year_from_date(&Some("".to_string())), None);
    }
}
