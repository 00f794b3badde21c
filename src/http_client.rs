//! Shared HTTP client
//!
//! One pooled `reqwest` client serves metadata lookups and manifest
//! fetches:
//! - HTTP/2 when the server offers it, HTTP/1.1 otherwise
//! - TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//! - DNS caching + Happy Eyeballs (IPv4/IPv6 racing)
//! - Browser-like request headers; some CDNs refuse bare clients

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument};

use crate::config::HttpConfig;
use crate::error::ResolveError;
use crate::stream::manifest::ManifestFetcher;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Pooled HTTP client with the crate's default headers and timeouts.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with default timeouts.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a client from the `[http]` config section.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            // Let the server negotiate HTTP/2
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .default_headers(default_headers())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL. Non-2xx statuses are returned, not raised.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> reqwest::Result<Response> {
        debug!("Fetching");
        let response = self.client.get(url).send().await?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            "Response received"
        );

        Ok(response)
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

#[async_trait]
impl ManifestFetcher for HttpClient {
    async fn fetch_manifest(&self, url: &str) -> crate::Result<String> {
        let response = self
            .fetch(url)
            .await
            .map_err(|e| ResolveError::manifest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::manifest(url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::manifest(url, e))
    }
}
