//! Manifest variant extraction.
//!
//! [`ManifestExtractor`] fetches a master manifest through a
//! [`ManifestFetcher`] and hands the body to a [`VariantScanner`]. Two
//! scanners exist:
//!
//! - [`PatternScanner`]: textual scan for `RESOLUTION=<w>x<h>` followed by
//!   the next absolute `https://` URL. Tolerates any manifest shape,
//!   including attribute orders a tag parser would reject.
//! - [`StreamInfParser`]: line-oriented `#EXT-X-STREAM-INF` parser that
//!   also resolves relative variant URIs.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};

use super::ResolutionSource;
use crate::config::ScannerKind;

/// Retrieves a manifest body as text.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// # Errors
    ///
    /// `ResolveError::ManifestFetch` on network failure or a non-2xx status.
    async fn fetch_manifest(&self, url: &str) -> crate::Result<String>;
}

/// Turns a manifest body into resolution-tagged variants, in manifest order.
pub trait VariantScanner: Send + Sync {
    fn name(&self) -> &'static str;

    /// `manifest_url` is where `body` came from, for resolving relative URIs.
    fn scan(&self, manifest_url: &str, body: &str) -> Vec<ResolutionSource>;
}

/// `[\s\S]*?` lets the URL sit on a later line; the lazy match stops at the
/// first `https://` after the declaration so consecutive variants do not
/// swallow each other.
static VARIANT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RESOLUTION=\d+x(\d+)[\s\S]*?(https://\S+)").expect("valid variant pattern")
});

/// Single left-to-right, non-overlapping textual scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternScanner;

impl VariantScanner for PatternScanner {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn scan(&self, _manifest_url: &str, body: &str) -> Vec<ResolutionSource> {
        VARIANT_PATTERN
            .captures_iter(body)
            .map(|caps| ResolutionSource::variant(&caps[1], &caps[2]))
            .collect()
    }
}

/// Parses `#EXT-X-STREAM-INF` tags and the URI line that follows each.
///
/// Variants without a `RESOLUTION` attribute are skipped since they carry no
/// quality label.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamInfParser;

impl StreamInfParser {
    fn parse_attributes(attr_str: &str) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        let mut rest = attr_str.trim();

        while !rest.is_empty() {
            let Some((key, after_key)) = rest.split_once('=') else {
                break;
            };

            let (value, remainder) = if let Some(quoted) = after_key.strip_prefix('"') {
                match quoted.split_once('"') {
                    Some((value, tail)) => (value, tail),
                    None => (quoted, ""),
                }
            } else {
                match after_key.split_once(',') {
                    Some((value, tail)) => (value, tail),
                    None => (after_key, ""),
                }
            };

            attrs.insert(key.trim().to_string(), value.to_string());
            rest = remainder.trim_start_matches(',').trim_start();
        }

        attrs
    }

    fn resolve_url(base: &str, relative: &str) -> String {
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return relative.to_string();
        }
        url::Url::parse(base)
            .and_then(|b| b.join(relative))
            .map_or_else(|_| relative.to_string(), String::from)
    }
}

impl VariantScanner for StreamInfParser {
    fn name(&self) -> &'static str {
        "stream-inf"
    }

    fn scan(&self, manifest_url: &str, body: &str) -> Vec<ResolutionSource> {
        let mut variants = Vec::new();
        let mut lines = body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .peekable();

        while let Some(line) = lines.next() {
            let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
                continue;
            };
            let height = Self::parse_attributes(rest)
                .get("RESOLUTION")
                .and_then(|r| r.split_once('x'))
                .and_then(|(_, h)| h.parse::<u32>().ok());

            // A tag in the URI slot is left for the next iteration
            let Some(uri) = lines.next_if(|l| !l.starts_with('#')) else {
                continue;
            };
            if let Some(height) = height {
                variants.push(ResolutionSource::variant(
                    height.to_string(),
                    Self::resolve_url(manifest_url, uri),
                ));
            }
        }

        variants
    }
}

/// Build the scanner named in config.
pub fn scanner_for(kind: ScannerKind) -> Box<dyn VariantScanner> {
    match kind {
        ScannerKind::Pattern => Box::new(PatternScanner),
        ScannerKind::StreamInf => Box::new(StreamInfParser),
    }
}

/// Fetches a manifest and lists its variants.
pub struct ManifestExtractor {
    fetcher: Arc<dyn ManifestFetcher>,
    scanner: Box<dyn VariantScanner>,
}

impl ManifestExtractor {
    pub fn new(fetcher: Arc<dyn ManifestFetcher>, scanner: Box<dyn VariantScanner>) -> Self {
        Self { fetcher, scanner }
    }

    /// Fetch `manifest_url` and scan it.
    ///
    /// A manifest without variants yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// `ResolveError::ManifestFetch` when the body cannot be retrieved.
    #[instrument(skip(self), fields(scanner = self.scanner.name()))]
    pub async fn extract_variants(&self, manifest_url: &str) -> crate::Result<Vec<ResolutionSource>> {
        let body = self.fetcher.fetch_manifest(manifest_url).await?;
        let variants = self.scanner.scan(manifest_url, &body);
        debug!(bytes = body.len(), variants = variants.len(), "Scanned manifest");
        Ok(variants)
    }
}
