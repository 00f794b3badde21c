//! Canonical metadata lookup.
//!
//! [`MetadataResolver`] asks a [`MetadataService`] for title, year and
//! season/episode ids. Lookups are lenient: when the service has no record,
//! or fails, the resolver still returns a [`CanonicalMedia`] carrying the
//! caller's identifiers with empty title and unknown year, and the pipeline
//! carries on with that.

pub mod tmdb;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::media::{CanonicalMedia, EpisodeRef, MediaQuery, MovieMedia, ShowMedia};

pub use tmdb::TmdbClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDetails {
    pub title: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowDetails {
    pub title: String,
    pub year: Option<i32>,
    pub season_id: String,
    pub episode_id: String,
    pub total_seasons: Option<u32>,
}

/// External metadata source.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// `Ok(None)` when the service has no such movie.
    async fn movie(&self, id: &str) -> crate::Result<Option<MovieDetails>>;

    /// `Ok(None)` when the service has no such show.
    async fn episode(
        &self,
        id: &str,
        season: u32,
        episode: u32,
    ) -> crate::Result<Option<ShowDetails>>;
}

/// Stand-in used when no metadata credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredMetadata;

#[async_trait]
impl MetadataService for UnconfiguredMetadata {
    async fn movie(&self, _id: &str) -> crate::Result<Option<MovieDetails>> {
        Ok(None)
    }

    async fn episode(
        &self,
        _id: &str,
        _season: u32,
        _episode: u32,
    ) -> crate::Result<Option<ShowDetails>> {
        Ok(None)
    }
}

pub struct MetadataResolver {
    service: Arc<dyn MetadataService>,
}

impl MetadataResolver {
    pub fn new(service: Arc<dyn MetadataService>) -> Self {
        Self { service }
    }

    pub async fn resolve(&self, query: &MediaQuery) -> CanonicalMedia {
        match query {
            MediaQuery::Movie { external_id } => self.resolve_movie(external_id).await,
            MediaQuery::Show {
                external_id,
                season,
                episode,
            } => self.resolve_show(external_id, *season, *episode).await,
        }
    }

    pub async fn resolve_movie(&self, external_id: &str) -> CanonicalMedia {
        let details = match self.service.movie(external_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                debug!(external_id, "No movie metadata, continuing without it");
                MovieDetails::default()
            }
            Err(e) => {
                warn!(external_id, error = %e, "Movie metadata lookup failed, continuing without it");
                MovieDetails::default()
            }
        };

        CanonicalMedia::Movie(MovieMedia {
            title: details.title,
            release_year: details.year,
            external_id: external_id.to_string(),
        })
    }

    pub async fn resolve_show(&self, external_id: &str, season: u32, episode: u32) -> CanonicalMedia {
        let details = match self.service.episode(external_id, season, episode).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                debug!(external_id, season, episode, "No show metadata, continuing without it");
                ShowDetails::default()
            }
            Err(e) => {
                warn!(external_id, season, episode, error = %e, "Show metadata lookup failed, continuing without it");
                ShowDetails::default()
            }
        };

        CanonicalMedia::Show(ShowMedia {
            title: details.title,
            release_year: details.year,
            external_id: external_id.to_string(),
            season: EpisodeRef {
                number: season,
                id: details.season_id,
            },
            episode: EpisodeRef {
                number: episode,
                id: details.episode_id,
            },
            number_of_seasons: details.total_seasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    struct Fixed;

    #[async_trait]
    impl MetadataService for Fixed {
        async fn movie(&self, id: &str) -> crate::Result<Option<MovieDetails>> {
            Ok((id == "603").then(|| MovieDetails {
                title: "The Matrix".into(),
                year: Some(1999),
            }))
        }

        async fn episode(
            &self,
            _id: &str,
            season: u32,
            episode: u32,
        ) -> crate::Result<Option<ShowDetails>> {
            Ok(Some(ShowDetails {
                title: "Game of Thrones".into(),
                year: Some(2011),
                season_id: format!("s{season}"),
                episode_id: format!("e{episode}"),
                total_seasons: Some(8),
            }))
        }
    }

    struct Failing;

    #[async_trait]
    impl MetadataService for Failing {
        async fn movie(&self, _id: &str) -> crate::Result<Option<MovieDetails>> {
            Err(ResolveError::upstream("tmdb", "connection reset"))
        }

        async fn episode(&self, _: &str, _: u32, _: u32) -> crate::Result<Option<ShowDetails>> {
            Err(ResolveError::upstream("tmdb", "connection reset"))
        }
    }

    #[tokio::test]
    async fn resolves_movie() {
        let resolver = MetadataResolver::new(Arc::new(Fixed));
        let media = resolver.resolve(&MediaQuery::movie("603").unwrap()).await;
        assert_eq!(media.title(), "The Matrix");
        assert_eq!(media.release_year(), Some(1999));
        assert_eq!(media.external_id(), "603");
    }

    #[tokio::test]
    async fn missing_movie_keeps_identifier() {
        let resolver = MetadataResolver::new(Arc::new(Fixed));
        let media = resolver.resolve_movie("999999").await;
        assert_eq!(media.title(), "");
        assert_eq!(media.release_year(), None);
        assert_eq!(media.external_id(), "999999");
    }

    #[tokio::test]
    async fn resolves_show_ids() {
        let resolver = MetadataResolver::new(Arc::new(Fixed));
        let media = resolver
            .resolve(&MediaQuery::show("1399", 3, 9).unwrap())
            .await;
        assert_eq!(media.season_id(), Some("s3"));
        assert_eq!(media.episode_id(), Some("e9"));
        assert_eq!(media.total_seasons(), Some(8));
    }

    #[tokio::test]
    async fn lookup_failure_is_lenient() {
        let resolver = MetadataResolver::new(Arc::new(Failing));
        let media = resolver.resolve_show("1399", 1, 2).await;
        let CanonicalMedia::Show(show) = media else {
            panic!("expected show");
        };
        assert_eq!(show.title, "");
        assert_eq!(show.season.number, 1);
        assert_eq!(show.episode.number, 2);
        assert_eq!(show.season.id, "");
        assert_eq!(show.number_of_seasons, None);
    }

    #[tokio::test]
    async fn unconfigured_service_returns_nothing() {
        let resolver = MetadataResolver::new(Arc::new(UnconfiguredMetadata));
        let media = resolver.resolve_movie("603").await;
        assert_eq!(media.title(), "");
    }
}
