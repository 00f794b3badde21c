//! TMDB v3 metadata client.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{MetadataService, MovieDetails, ShowDetails};
use crate::config::TmdbConfig;
use crate::error::ResolveError;
use crate::http_client::HttpClient;

const SERVICE: &str = "tmdb";

pub struct TmdbClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, api_key: impl Into<String>, config: &TmdbConfig) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}?api_key={}&language={}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        )
    }

    /// GET a TMDB resource. 404 is `Ok(None)`.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> crate::Result<Option<T>> {
        debug!(path, "TMDB request");
        let response = self
            .http
            .inner()
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ResolveError::upstream(SERVICE, e.without_url()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResolveError::upstream(
                SERVICE,
                format!("HTTP {status}: {}", message.trim()),
            ));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ResolveError::upstream(SERVICE, e.without_url()))
    }
}

#[async_trait]
impl MetadataService for TmdbClient {
    #[instrument(skip(self))]
    async fn movie(&self, id: &str) -> crate::Result<Option<MovieDetails>> {
        let movie: Option<TmdbMovie> = self
            .get(&format!("/movie/{}", urlencoding::encode(id)))
            .await?;

        Ok(movie.map(|m| MovieDetails {
            title: m.title,
            year: release_year(m.release_date.as_deref()),
        }))
    }

    #[instrument(skip(self))]
    async fn episode(
        &self,
        id: &str,
        season: u32,
        episode: u32,
    ) -> crate::Result<Option<ShowDetails>> {
        let id = urlencoding::encode(id);
        let Some(show) = self.get::<TmdbShow>(&format!("/tv/{id}")).await? else {
            return Ok(None);
        };

        let season_id = show
            .seasons
            .iter()
            .find(|s| s.season_number == season)
            .map(|s| s.id.to_string())
            .unwrap_or_default();

        // Episode id is optional once the show is known
        let episode_id = match self
            .get::<TmdbEpisode>(&format!("/tv/{id}/season/{season}/episode/{episode}"))
            .await
        {
            Ok(found) => found.map(|e| e.id.to_string()).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Episode lookup failed, keeping show details");
                String::new()
            }
        };

        Ok(Some(ShowDetails {
            title: show.name,
            year: release_year(show.first_air_date.as_deref()),
            season_id,
            episode_id,
            total_seasons: show.number_of_seasons,
        }))
    }
}

/// Year of a TMDB `YYYY-MM-DD` date. TMDB sends `""` for unknown dates.
fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.year())
}

// Serde structures for TMDB API responses

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    title: String,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbShow {
    #[serde(default)]
    name: String,
    first_air_date: Option<String>,
    number_of_seasons: Option<u32>,
    #[serde(default)]
    seasons: Vec<TmdbSeason>,
}

#[derive(Debug, Deserialize)]
struct TmdbSeason {
    id: u64,
    season_number: u32,
}

#[derive(Debug, Deserialize)]
struct TmdbEpisode {
    id: u64,
}
