//! `reelsource` - movie and episode stream resolution
//!
//! Turns a TMDB id (plus season and episode for shows) into a list of
//! playable HLS sources tagged by resolution, and subtitle tracks with
//! human-readable language names.
//!
//! # Pipeline
//!
//! - **Metadata**: title, year and episode ids from TMDB, lenient on failure
//! - **Provider**: scraper plugins list embeds; the first one yielding an
//!   HLS stream wins
//! - **Manifest**: the master playlist is fetched and scanned for variants
//! - **Normalize**: master manifest first as `"auto"`, then each variant
//!
//! # Example
//!
//! ```rust,no_run
//! use reelsource::{Config, MediaQuery, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let resolver = Resolver::from_config(&config)?;
//!     let result = resolver.resolve(&MediaQuery::movie("603")?, None, None).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_client;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod scraper;
pub mod server;
pub mod stream;

pub use config::{Config, ScannerKind};
pub use error::{ResolveError, Result};
pub use http_client::HttpClient;
pub use media::{CanonicalMedia, MediaKind, MediaQuery};
pub use metadata::{MetadataResolver, MetadataService, TmdbClient, UnconfiguredMetadata};
pub use pipeline::Resolver;
pub use scraper::{EmbedRef, EmbedScraper, PluginRegistry, ScrapedStream, SourceScraper};
pub use stream::{
    normalize, ManifestExtractor, ManifestFetcher, ProviderOrchestrator, ResolutionResult,
    ResolutionSource, StreamDescriptor, SubtitleTrack,
};

/// Version of reelsource
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
