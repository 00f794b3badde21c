//! Stream resolution: provider orchestration, manifest variant extraction
//! and response normalization.
//!
//! The stages run in that order for each request, each consuming the
//! previous stage's value:
//!
//! - [`ProviderOrchestrator`] turns canonical metadata into a
//!   [`StreamDescriptor`] (or nothing)
//! - [`ManifestExtractor`] fetches the descriptor's manifest and lists its
//!   variants
//! - [`normalize`] merges both into a [`ResolutionResult`]

pub mod lang;
pub mod manifest;
pub mod normalize;
pub mod orchestrator;

use serde::Serialize;

pub use manifest::{ManifestExtractor, ManifestFetcher, PatternScanner, StreamInfParser, VariantScanner};
pub use normalize::normalize;
pub use orchestrator::ProviderOrchestrator;

/// Quality label of the master-manifest entry.
pub const AUTO_QUALITY: &str = "auto";

/// A playable manifest returned by an embed scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub manifest_url: String,
    pub is_manifest_format: bool,
    /// Caption tracks in provider order, language codes as the provider
    /// sent them.
    pub caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub url: String,
}

/// One playable variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSource {
    /// `"auto"` or a vertical resolution such as `"1080"`.
    pub quality: String,
    pub url: String,
    #[serde(rename = "isM3U8")]
    pub is_manifest_format: bool,
}

impl ResolutionSource {
    pub fn auto(url: impl Into<String>) -> Self {
        Self::variant(AUTO_QUALITY, url)
    }

    pub fn variant(quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            url: url.into(),
            is_manifest_format: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    /// Human-readable language name, or the raw code when unknown.
    #[serde(rename = "lang")]
    pub language: String,
    pub url: String,
}

/// Response body for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub sources: Vec<ResolutionSource>,
    pub subtitles: Vec<SubtitleTrack>,
}

impl ResolutionResult {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.subtitles.is_empty()
    }
}
