//! Provider orchestration: source scrape, then embeds in order until one
//! yields an HLS stream.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::{CaptionTrack, StreamDescriptor};
use crate::error::ResolveError;
use crate::media::CanonicalMedia;
use crate::scraper::{EmbedRef, EmbedScraper, ScrapedStream, SourceScraper};

pub struct ProviderOrchestrator {
    source: Arc<dyn SourceScraper>,
    embed: Arc<dyn EmbedScraper>,
}

impl ProviderOrchestrator {
    pub fn new(source: Arc<dyn SourceScraper>, embed: Arc<dyn EmbedScraper>) -> Self {
        Self { source, embed }
    }

    /// Provider ids the source scraper can serve.
    pub fn providers(&self) -> Vec<String> {
        self.source.provider_ids()
    }

    /// Resolve `media` on `provider_id` to a stream descriptor.
    ///
    /// Embeds are tried in provider order, except that the embed whose id
    /// equals `preferred_embed` (when given and present) goes first.
    /// Returns `Ok(None)` when the provider has no embeds or no embed yields
    /// an HLS stream. An embed that fails is skipped; if no later embed
    /// succeeds, the last such failure is returned.
    ///
    /// # Errors
    ///
    /// `ResolveError::Upstream` when the source scrape fails, or when every
    /// embed came up empty and at least one of them failed.
    #[instrument(skip(self, media), fields(external_id = media.external_id()))]
    pub async fn resolve_stream(
        &self,
        media: &CanonicalMedia,
        provider_id: &str,
        preferred_embed: Option<&str>,
    ) -> crate::Result<Option<StreamDescriptor>> {
        let embeds = self.source.scrape_source(media, provider_id).await?;
        let embeds = prefer_embed(embeds, preferred_embed);
        if embeds.is_empty() {
            info!("Provider returned no embeds");
            return Ok(None);
        }

        let mut last_error: Option<ResolveError> = None;

        for embed in &embeds {
            match self.embed.scrape_embed(provider_id, embed).await {
                Ok(Some(ScrapedStream::Hls { playlist, captions })) => {
                    debug!(embed = %embed.embed_id, playlist = %playlist, "Embed yielded HLS stream");
                    return Ok(Some(StreamDescriptor {
                        manifest_url: playlist,
                        is_manifest_format: true,
                        caption_tracks: captions
                            .into_iter()
                            .map(|c| CaptionTrack {
                                language_code: c.language,
                                url: c.url,
                            })
                            .collect(),
                    }));
                }
                Ok(Some(ScrapedStream::Other)) => {
                    debug!(embed = %embed.embed_id, "Embed stream is not HLS, trying next");
                }
                Ok(None) => {
                    debug!(embed = %embed.embed_id, "Embed yielded no stream, trying next");
                }
                Err(e) => {
                    warn!(embed = %embed.embed_id, error = %e, "Embed scrape failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => {
                info!(embeds = embeds.len(), "No embed yielded an HLS stream");
                Ok(None)
            }
        }
    }
}

/// Move the first embed with id `preferred` to the front, keeping the rest
/// in provider order.
fn prefer_embed(mut embeds: Vec<EmbedRef>, preferred: Option<&str>) -> Vec<EmbedRef> {
    let Some(preferred) = preferred else {
        return embeds;
    };
    match embeds.iter().position(|e| e.embed_id == preferred) {
        Some(pos) => {
            let chosen = embeds.remove(pos);
            embeds.insert(0, chosen);
        }
        None => debug!(preferred, "Preferred embed not offered, using provider order"),
    }
    embeds
}
