//! Configuration loaded from `~/.config/reelsource/config.toml`.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//! `TMDB_API_KEY` and `REELSOURCE_BIND` override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider used when a request does not name one.
    pub default_provider: String,
    pub tmdb: TmdbConfig,
    pub http: HttpConfig,
    pub manifest: ManifestConfig,
    pub server: ServerConfig,
    /// Scraper plugins, one per provider id.
    pub providers: Vec<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: "zoechip".to_string(),
            tmdb: TmdbConfig::default(),
            http: HttpConfig::default(),
            manifest: ManifestConfig::default(),
            server: ServerConfig::default(),
            providers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// v3 API key. Without one, metadata lookups are skipped.
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Which variant scanner reads fetched manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScannerKind {
    /// Textual `RESOLUTION=` … `https://` scan.
    #[default]
    Pattern,
    /// Line-oriented `#EXT-X-STREAM-INF` parser.
    StreamInf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub scanner: ScannerKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Deadline for one whole resolution. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// A scraper plugin binary serving one provider id.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Provider id passed to the source scraper (e.g. `"zoechip"`).
    pub id: String,
    /// Path to the plugin binary.
    pub binary: PathBuf,
    /// Extra arguments for the binary.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file is not an error; a missing explicit path is.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                self.tmdb.api_key = Some(key);
            }
        }
        if let Ok(bind) = std::env::var("REELSOURCE_BIND") {
            if !bind.is_empty() {
                self.server.bind = bind;
            }
        }
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelsource")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.default_provider, "zoechip");
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.manifest.scanner, ScannerKind::Pattern);
        assert!(config.providers.is_empty());
        assert!(config.server.request_timeout_secs.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_provider = "primewire"

[tmdb]
api_key = "abc"
language = "fi-FI"

[http]
timeout_secs = 5

[manifest]
scanner = "stream-inf"

[server]
bind = "0.0.0.0:8080"
request_timeout_secs = 45

[[providers]]
id = "primewire"
binary = "/usr/local/bin/scraper"
args = ["--provider", "primewire"]

[[providers]]
id = "zoechip"
binary = "/usr/local/bin/scraper"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_provider, "primewire");
        assert_eq!(config.tmdb.api_key.as_deref(), Some("abc"));
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.manifest.scanner, ScannerKind::StreamInf);
        assert_eq!(config.server.request_timeout_secs, Some(45));
        let ids: Vec<&str> = config.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["primewire", "zoechip"]);
        assert_eq!(config.providers[0].args, vec!["--provider", "primewire"]);
        assert!(config.providers[1].args.is_empty());
    }

    #[test]
    fn rejects_unknown_scanner() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[manifest]\nscanner = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_provider = \"primewire\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.default_provider, "primewire");
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/reelsource.toml")));
        assert!(result.is_err());
    }
}
