//! Plugin runner: external scraper binaries as [`SourceScraper`] and
//! [`EmbedScraper`].

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{EmbedRef, EmbedScraper, ScrapedStream, SourceScraper};
use crate::config::ProviderConfig;
use crate::error::ResolveError;
use crate::media::CanonicalMedia;

/// JSON sent to the plugin on stdin.
#[derive(Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum PluginRequest<'a> {
    #[serde(rename_all = "camelCase")]
    Source {
        provider_id: &'a str,
        media: &'a CanonicalMedia,
    },
    #[serde(rename_all = "camelCase")]
    Embed {
        provider_id: &'a str,
        embed_id: &'a str,
        url: &'a str,
    },
}

#[derive(Deserialize)]
struct SourceOutput {
    #[serde(default)]
    embeds: Vec<EmbedRef>,
}

#[derive(Deserialize)]
struct EmbedOutput {
    #[serde(default)]
    stream: Option<ScrapedStream>,
}

/// Runs one provider's scraper binary.
///
/// Each call spawns the binary, writes the request to stdin and parses
/// stdout. A non-zero exit, unparseable output or a missing binary is an
/// upstream failure.
#[derive(Debug, Clone)]
pub struct PluginScraper {
    config: ProviderConfig,
}

impl PluginScraper {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn provider_id(&self) -> &str {
        &self.config.id
    }

    async fn call<T: DeserializeOwned>(&self, request: &PluginRequest<'_>) -> crate::Result<T> {
        let input = serde_json::to_string(request)
            .map_err(|e| ResolveError::upstream(&self.config.id, e))?;

        run_plugin(&self.config, &input)
            .await
            .map_err(|e| ResolveError::upstream(&self.config.id, format!("{e:#}")))
    }
}

/// Run the plugin once. The child is killed if this future is dropped, so a
/// caller deadline also ends a hung plugin.
async fn run_plugin<T: DeserializeOwned>(config: &ProviderConfig, input: &str) -> Result<T> {
    let binary = &config.binary;
    let plugin_name = &config.id;

    if !binary.exists() {
        bail!(
            "plugin '{plugin_name}' binary not found at {}",
            binary.display()
        );
    }

    let mut child = Command::new(binary)
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn plugin '{plugin_name}'"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .await
            .with_context(|| format!("failed to write to plugin '{plugin_name}' stdin"))?;
        // stdin drops here so the plugin sees EOF
    }

    let result = child
        .wait_with_output()
        .await
        .with_context(|| format!("plugin '{plugin_name}' failed"))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        bail!(
            "plugin '{plugin_name}' exited with {}: {}",
            result.status,
            stderr.trim()
        );
    }

    let stdout = String::from_utf8(result.stdout)
        .with_context(|| format!("plugin '{plugin_name}' output is not valid UTF-8"))?;

    serde_json::from_str::<T>(&stdout).with_context(|| {
        let preview: String = stdout.chars().take(200).collect();
        format!("plugin '{plugin_name}' returned invalid JSON: {preview}")
    })
}

#[async_trait]
impl SourceScraper for PluginScraper {
    fn provider_ids(&self) -> Vec<String> {
        vec![self.config.id.clone()]
    }

    #[instrument(skip(self, media), fields(plugin = %self.config.id))]
    async fn scrape_source(
        &self,
        media: &CanonicalMedia,
        provider_id: &str,
    ) -> crate::Result<Vec<EmbedRef>> {
        let output: SourceOutput = self
            .call(&PluginRequest::Source { provider_id, media })
            .await?;
        debug!(embeds = output.embeds.len(), "Source scraper answered");
        Ok(output.embeds)
    }
}

#[async_trait]
impl EmbedScraper for PluginScraper {
    #[instrument(skip(self, embed), fields(plugin = %self.config.id, embed = %embed.embed_id))]
    async fn scrape_embed(
        &self,
        provider_id: &str,
        embed: &EmbedRef,
    ) -> crate::Result<Option<ScrapedStream>> {
        let output: EmbedOutput = self
            .call(&PluginRequest::Embed {
                provider_id,
                embed_id: &embed.embed_id,
                url: &embed.url,
            })
            .await?;
        Ok(output.stream)
    }
}

/// Routes scraper calls to the plugin registered for the provider id.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginScraper>,
}

impl PluginRegistry {
    pub fn new(configs: &[ProviderConfig]) -> Self {
        Self {
            plugins: configs.iter().cloned().map(PluginScraper::new).collect(),
        }
    }

    fn plugin(&self, provider_id: &str) -> crate::Result<&PluginScraper> {
        self.plugins
            .iter()
            .find(|p| p.provider_id() == provider_id)
            .ok_or_else(|| {
                ResolveError::Config(format!("no scraper plugin configured for '{provider_id}'"))
            })
    }
}

#[async_trait]
impl SourceScraper for PluginRegistry {
    fn provider_ids(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|p| p.provider_id().to_string())
            .collect()
    }

    async fn scrape_source(
        &self,
        media: &CanonicalMedia,
        provider_id: &str,
    ) -> crate::Result<Vec<EmbedRef>> {
        self.plugin(provider_id)?
            .scrape_source(media, provider_id)
            .await
    }
}

#[async_trait]
impl EmbedScraper for PluginRegistry {
    async fn scrape_embed(
        &self,
        provider_id: &str,
        embed: &EmbedRef,
    ) -> crate::Result<Option<ScrapedStream>> {
        self.plugin(provider_id)?
            .scrape_embed(provider_id, embed)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MovieMedia;
    use std::path::PathBuf;
    use std::time::Duration;

    fn movie() -> CanonicalMedia {
        CanonicalMedia::Movie(MovieMedia {
            title: "The Matrix".into(),
            release_year: Some(1999),
            external_id: "603".into(),
        })
    }

    fn config(id: &str, binary: &str, args: &[&str]) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            binary: PathBuf::from(binary),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    #[test]
    fn source_request_shape() {
        let media = movie();
        let json = serde_json::to_value(PluginRequest::Source {
            provider_id: "zoechip",
            media: &media,
        })
        .unwrap();
        assert_eq!(json["op"], "source");
        assert_eq!(json["providerId"], "zoechip");
        assert_eq!(json["media"]["type"], "movie");
        assert_eq!(json["media"]["tmdbId"], "603");
    }

    #[test]
    fn embed_request_shape() {
        let json = serde_json::to_value(PluginRequest::Embed {
            provider_id: "zoechip",
            embed_id: "upcloud",
            url: "https://e/1",
        })
        .unwrap();
        assert_eq!(json["op"], "embed");
        assert_eq!(json["embedId"], "upcloud");
        assert_eq!(json["url"], "https://e/1");
    }

    #[tokio::test]
    async fn missing_binary_is_upstream_error() {
        let scraper = PluginScraper::new(config("zoechip", "/nonexistent/scraper", &[]));
        let err = scraper.scrape_source(&movie(), "zoechip").await.unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert!(err.to_string().contains("binary not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_plugin_and_parses_embeds() {
        let scraper = PluginScraper::new(config(
            "zoechip",
            "/bin/sh",
            &[
                "-c",
                r#"cat >/dev/null; echo '{"embeds":[{"embedId":"upcloud","url":"https://e/1"}]}'"#,
            ],
        ));
        let embeds = scraper.scrape_source(&movie(), "zoechip").await.unwrap();
        assert_eq!(
            embeds,
            vec![EmbedRef {
                embed_id: "upcloud".into(),
                url: "https://e/1".into(),
            }]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn plugin_sees_request_on_stdin() {
        // Echo the op back as the embed id
        let scraper = PluginScraper::new(config(
            "zoechip",
            "/bin/sh",
            &[
                "-c",
                r#"op=$(sed -n 's/.*"op":"\([a-z]*\)".*/\1/p'); echo "{\"embeds\":[{\"embedId\":\"$op\",\"url\":\"u\"}]}""#,
            ],
        ));
        let embeds = scraper.scrape_source(&movie(), "zoechip").await.unwrap();
        assert_eq!(embeds[0].embed_id, "source");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_upstream_error() {
        let scraper = PluginScraper::new(config(
            "zoechip",
            "/bin/sh",
            &["-c", "cat >/dev/null; echo 'provider blocked' >&2; exit 3"],
        ));
        let err = scraper
            .scrape_embed(
                "zoechip",
                &EmbedRef {
                    embed_id: "upcloud".into(),
                    url: "https://e/1".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert!(err.to_string().contains("provider blocked"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn invalid_json_is_upstream_error() {
        let scraper = PluginScraper::new(config(
            "zoechip",
            "/bin/sh",
            &["-c", "cat >/dev/null; echo 'not json'"],
        ));
        let err = scraper.scrape_source(&movie(), "zoechip").await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn embed_null_stream() {
        let scraper = PluginScraper::new(config(
            "zoechip",
            "/bin/sh",
            &["-c", r#"cat >/dev/null; echo '{"stream":null}'"#],
        ));
        let stream = scraper
            .scrape_embed(
                "zoechip",
                &EmbedRef {
                    embed_id: "upcloud".into(),
                    url: "https://e/1".into(),
                },
            )
            .await
            .unwrap();
        assert!(stream.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dropped_call_kills_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 1; touch '{}'", marker.display());
        let scraper = PluginScraper::new(config("zoechip", "/bin/sh", &["-c", script.as_str()]));

        let outcome = tokio::time::timeout(
            Duration::from_millis(200),
            scraper.scrape_source(&movie(), "zoechip"),
        )
        .await;
        assert!(outcome.is_err());

        // A surviving shell would create the marker after its sleep
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn registry_rejects_unknown_provider() {
        let registry = PluginRegistry::new(&[config("zoechip", "/nonexistent", &[])]);
        assert_eq!(registry.provider_ids(), vec!["zoechip".to_string()]);
        let err = registry
            .scrape_source(&movie(), "primewire")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
