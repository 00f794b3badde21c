//! Request and metadata types shared by every pipeline stage.

use serde::Serialize;

use crate::error::{ResolveError, Result};

/// What the caller asked for. Construct through [`MediaQuery::movie`],
/// [`MediaQuery::show`] or [`MediaQuery::from_raw`], which enforce that
/// identifiers are non-empty and season/episode numbers are positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaQuery {
    Movie {
        external_id: String,
    },
    Show {
        external_id: String,
        season: u32,
        episode: u32,
    },
}

impl MediaQuery {
    pub fn movie(external_id: impl Into<String>) -> Result<Self> {
        let external_id: String = external_id.into();
        let external_id = required_id(Some(&external_id))?;
        Ok(Self::Movie { external_id })
    }

    pub fn show(external_id: impl Into<String>, season: u32, episode: u32) -> Result<Self> {
        let external_id: String = external_id.into();
        let external_id = required_id(Some(&external_id))?;
        if episode == 0 {
            return Err(ResolveError::Validation(
                "episode must be a positive integer".into(),
            ));
        }
        if season == 0 {
            return Err(ResolveError::Validation(
                "season must be a positive integer".into(),
            ));
        }
        Ok(Self::Show {
            external_id,
            season,
            episode,
        })
    }

    /// Build a query from untyped request parameters.
    ///
    /// A show is requested when `kind` is [`MediaKind::Show`]; its checks run
    /// in the order id, episode, season so the first complaint matches what
    /// existing clients expect.
    pub fn from_raw(
        kind: MediaKind,
        external_id: Option<&str>,
        season: Option<&str>,
        episode: Option<&str>,
    ) -> Result<Self> {
        let external_id = required_id(external_id)?;
        match kind {
            MediaKind::Movie => Ok(Self::Movie { external_id }),
            MediaKind::Show => {
                let episode = positive("episode", episode)?;
                let season = positive("season", season)?;
                Ok(Self::Show {
                    external_id,
                    season,
                    episode,
                })
            }
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Movie { .. } => MediaKind::Movie,
            Self::Show { .. } => MediaKind::Show,
        }
    }

    pub fn external_id(&self) -> &str {
        match self {
            Self::Movie { external_id } | Self::Show { external_id, .. } => external_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
}

fn required_id(raw: Option<&str>) -> Result<String> {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ResolveError::Validation("tmdb id is required".into())),
    }
}

fn positive(name: &str, raw: Option<&str>) -> Result<u32> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ResolveError::Validation(format!("{name} is required")))?;

    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ResolveError::Validation(format!(
            "{name} must be a positive integer"
        ))),
    }
}

/// Resolved metadata for one request. Serialized as the `media` object sent
/// to scraper plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanonicalMedia {
    Movie(MovieMedia),
    Show(ShowMedia),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieMedia {
    pub title: String,
    /// `None` when the metadata service had no release date.
    pub release_year: Option<i32>,
    #[serde(rename = "tmdbId")]
    pub external_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowMedia {
    pub title: String,
    pub release_year: Option<i32>,
    #[serde(rename = "tmdbId")]
    pub external_id: String,
    pub season: EpisodeRef,
    pub episode: EpisodeRef,
    pub number_of_seasons: Option<u32>,
}

/// A season or episode: the number the caller asked for plus the metadata
/// service's internal id for it (empty when unresolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRef {
    pub number: u32,
    #[serde(rename = "tmdbId")]
    pub id: String,
}

impl CanonicalMedia {
    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Show(s) => &s.title,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        match self {
            Self::Movie(m) => m.release_year,
            Self::Show(s) => s.release_year,
        }
    }

    pub fn external_id(&self) -> &str {
        match self {
            Self::Movie(m) => &m.external_id,
            Self::Show(s) => &s.external_id,
        }
    }

    pub fn season_id(&self) -> Option<&str> {
        match self {
            Self::Movie(_) => None,
            Self::Show(s) => Some(&s.season.id),
        }
    }

    pub fn episode_id(&self) -> Option<&str> {
        match self {
            Self::Movie(_) => None,
            Self::Show(s) => Some(&s.episode.id),
        }
    }

    pub fn total_seasons(&self) -> Option<u32> {
        match self {
            Self::Movie(_) => None,
            Self::Show(s) => s.number_of_seasons,
        }
    }
}
