//! End-to-end resolution: metadata, provider, manifest, normalize.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use crate::config::Config;
use crate::error::ResolveError;
use crate::http_client::HttpClient;
use crate::media::{CanonicalMedia, MediaQuery};
use crate::metadata::{MetadataResolver, MetadataService, TmdbClient, UnconfiguredMetadata};
use crate::scraper::{EmbedScraper, PluginRegistry, SourceScraper};
use crate::stream::manifest::scanner_for;
use crate::stream::{
    normalize, ManifestExtractor, ManifestFetcher, ProviderOrchestrator, ResolutionResult,
    VariantScanner,
};

/// Runs the resolution stages in order for one query.
///
/// Holds no per-request state, so one instance serves any number of
/// concurrent requests.
pub struct Resolver {
    metadata: MetadataResolver,
    orchestrator: ProviderOrchestrator,
    extractor: ManifestExtractor,
    default_provider: String,
    timeout: Option<Duration>,
}

impl Resolver {
    pub fn new(
        metadata: Arc<dyn MetadataService>,
        source: Arc<dyn SourceScraper>,
        embed: Arc<dyn EmbedScraper>,
        fetcher: Arc<dyn ManifestFetcher>,
        scanner: Box<dyn VariantScanner>,
    ) -> Self {
        Self {
            metadata: MetadataResolver::new(metadata),
            orchestrator: ProviderOrchestrator::new(source, embed),
            extractor: ManifestExtractor::new(fetcher, scanner),
            default_provider: "zoechip".to_string(),
            timeout: None,
        }
    }

    /// Wire the production stages from configuration: TMDB (when a key is
    /// set), plugin scrapers and the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = HttpClient::with_config(&config.http)?;

        let metadata: Arc<dyn MetadataService> = match &config.tmdb.api_key {
            Some(key) => Arc::new(TmdbClient::new(http.clone(), key.as_str(), &config.tmdb)),
            None => {
                info!("No TMDB API key configured, metadata lookups disabled");
                Arc::new(UnconfiguredMetadata)
            }
        };

        let plugins = Arc::new(PluginRegistry::new(&config.providers));

        let resolver = Self::new(
            metadata,
            plugins.clone(),
            plugins,
            Arc::new(http),
            scanner_for(config.manifest.scanner),
        )
        .with_default_provider(&config.default_provider);

        Ok(match config.server.request_timeout_secs {
            Some(secs) => resolver.with_timeout(Duration::from_secs(secs)),
            None => resolver,
        })
    }

    #[must_use]
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    /// Bound each [`Resolver::resolve`] call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Provider ids that have a scraper.
    pub fn providers(&self) -> Vec<String> {
        self.orchestrator.providers()
    }

    /// Resolve `query` on `provider` (or the default provider). `server`
    /// names an embed to try before the provider's own order.
    ///
    /// # Errors
    ///
    /// `Upstream` or `ManifestFetch` from the failing stage, `Config` for a
    /// provider without a scraper, `Timeout` when the configured deadline
    /// elapses.
    pub async fn resolve(
        &self,
        query: &MediaQuery,
        provider: Option<&str>,
        server: Option<&str>,
    ) -> crate::Result<ResolutionResult> {
        let provider = provider.unwrap_or(&self.default_provider);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(query, provider, server))
                .await
                .map_err(|_| ResolveError::Timeout(limit))?,
            None => self.run(query, provider, server).await,
        }
    }

    #[instrument(skip(self), fields(kind = ?query.kind(), external_id = query.external_id()))]
    async fn run(
        &self,
        query: &MediaQuery,
        provider: &str,
        server: Option<&str>,
    ) -> crate::Result<ResolutionResult> {
        let media: CanonicalMedia = self.metadata.resolve(query).await;

        let Some(descriptor) = self
            .orchestrator
            .resolve_stream(&media, provider, server)
            .await?
        else {
            return Ok(normalize(None, Vec::new()));
        };

        let variants = self
            .extractor
            .extract_variants(&descriptor.manifest_url)
            .await?;

        let result = normalize(Some(&descriptor), variants);
        info!(
            sources = result.sources.len(),
            subtitles = result.subtitles.len(),
            "Resolved"
        );
        Ok(result)
    }
}
