//! Source and embed scraper contracts.
//!
//! A source scraper turns canonical metadata into embed references for one
//! provider; an embed scraper turns one reference into a concrete stream.
//! Both are external services reached through [`PluginRegistry`], which runs
//! one plugin binary per provider.
//!
//! # Protocol
//!
//! The plugin receives one JSON request on stdin and answers with one JSON
//! document on stdout.
//!
//! Source request:
//! ```json
//! {"op": "source", "providerId": "zoechip", "media": {"type": "movie", "title": "…", "releaseYear": 1999, "tmdbId": "603"}}
//! ```
//! answered by `{"embeds": [{"embedId": "upcloud", "url": "https://…"}]}`.
//!
//! Embed request:
//! ```json
//! {"op": "embed", "providerId": "zoechip", "embedId": "upcloud", "url": "https://…"}
//! ```
//! answered by
//! `{"stream": {"type": "hls", "playlist": "https://…/master.m3u8", "captions": [{"language": "en", "url": "https://…"}]}}`
//! or `{"stream": null}`.

pub mod plugin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::media::CanonicalMedia;

pub use plugin::{PluginRegistry, PluginScraper};

/// Reference to a provider embed page or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedRef {
    pub embed_id: String,
    pub url: String,
}

/// Stream returned by an embed scraper. Only HLS streams are usable; every
/// other `type` deserializes to [`ScrapedStream::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScrapedStream {
    Hls {
        playlist: String,
        #[serde(default)]
        captions: Vec<ScrapedCaption>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScrapedCaption {
    pub language: String,
    pub url: String,
}

#[async_trait]
pub trait SourceScraper: Send + Sync {
    /// Provider ids this scraper can serve.
    fn provider_ids(&self) -> Vec<String>;

    /// Embed references for `media` on `provider_id`, in provider order.
    ///
    /// # Errors
    ///
    /// `ResolveError::Upstream` when the scraper call itself fails. Zero
    /// embeds is `Ok(vec![])`.
    async fn scrape_source(
        &self,
        media: &CanonicalMedia,
        provider_id: &str,
    ) -> crate::Result<Vec<EmbedRef>>;
}

#[async_trait]
pub trait EmbedScraper: Send + Sync {
    /// Resolve one embed. `Ok(None)` means the embed yielded no stream.
    ///
    /// # Errors
    ///
    /// `ResolveError::Upstream` when the scraper call itself fails.
    async fn scrape_embed(
        &self,
        provider_id: &str,
        embed: &EmbedRef,
    ) -> crate::Result<Option<ScrapedStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Envelope {
        stream: Option<ScrapedStream>,
    }

    #[test]
    fn parses_hls_stream() {
        let json = r#"{"stream":{"type":"hls","id":"primary","playlist":"https://a/master.m3u8","flags":[],"captions":[{"id":"c1","language":"en","url":"https://a/en.vtt","type":"vtt","hasCorsRestrictions":false}]}}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            env.stream,
            Some(ScrapedStream::Hls {
                playlist: "https://a/master.m3u8".into(),
                captions: vec![ScrapedCaption {
                    language: "en".into(),
                    url: "https://a/en.vtt".into(),
                }],
            })
        );
    }

    #[test]
    fn hls_captions_default_to_empty() {
        let json = r#"{"stream":{"type":"hls","playlist":"https://a/master.m3u8"}}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert!(matches!(
            env.stream,
            Some(ScrapedStream::Hls { ref captions, .. }) if captions.is_empty()
        ));
    }

    #[test]
    fn other_stream_types_are_unusable() {
        let json = r#"{"stream":{"type":"file","qualities":{"720":{"type":"mp4","url":"https://a/720.mp4"}},"captions":[]}}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.stream, Some(ScrapedStream::Other));
    }

    #[test]
    fn null_stream() {
        let env: Envelope = serde_json::from_str(r#"{"stream":null}"#).unwrap();
        assert!(env.stream.is_none());
    }

    #[test]
    fn embed_ref_uses_camel_case() {
        let embed: EmbedRef =
            serde_json::from_str(r#"{"embedId":"upcloud","url":"https://e/1"}"#).unwrap();
        assert_eq!(embed.embed_id, "upcloud");
    }
}
