//! Error taxonomy for the resolution pipeline.
//!
//! Empty outcomes (no embeds, a non-HLS stream, a manifest without
//! variants) are not errors and never appear here; they surface as an
//! empty [`ResolutionResult`](crate::ResolutionResult).

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a pipeline stage.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Missing or malformed request input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// A source- or embed-scraper call itself failed.
    #[error("provider '{provider}' failed: {reason}")]
    Upstream { provider: String, reason: String },

    /// The manifest body could not be retrieved.
    #[error("failed to fetch manifest {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    /// The caller's deadline elapsed before the pipeline finished.
    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ResolveError {
    pub(crate) fn upstream(provider: &str, reason: impl std::fmt::Display) -> Self {
        Self::Upstream {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn manifest(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::ManifestFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable tag used as `errorKind` in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Upstream { .. } => "upstream",
            Self::ManifestFetch { .. } => "manifest_fetch",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
        }
    }

    /// Whether the error was caused by the request rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
