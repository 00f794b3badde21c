//! `reelsource` CLI - resolve streams from a terminal or serve them over HTTP

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelsource::{Config, MediaQuery, Resolver};

#[derive(Parser)]
#[command(name = "reelsource")]
#[command(about = "Resolve movie and episode streams into HLS sources and subtitles")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/reelsource/config.toml)
    #[arg(long, global = true, env = "REELSOURCE_CONFIG")]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a movie by TMDB id
    Movie {
        /// TMDB movie id
        tmdb_id: String,

        /// Provider to scrape (default: config `default_provider`)
        #[arg(short, long)]
        provider: Option<String>,

        /// Embed id to try first (e.g. upcloud)
        #[arg(long)]
        server: Option<String>,
    },

    /// Resolve a TV episode by TMDB show id
    Tv {
        /// TMDB show id
        tmdb_id: String,

        /// Season number (1-based)
        #[arg(short, long)]
        season: u32,

        /// Episode number (1-based)
        #[arg(short, long)]
        episode: u32,

        /// Provider to scrape (default: config `default_provider`)
        #[arg(short, long)]
        provider: Option<String>,

        /// Embed id to try first (e.g. upcloud)
        #[arg(long)]
        server: Option<String>,
    },

    /// Run the HTTP server
    Serve {
        /// Address to bind (default: config `server.bind`)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Movie {
            tmdb_id,
            provider,
            server,
        } => {
            let query = MediaQuery::movie(tmdb_id)?;
            let target = Target {
                provider: provider.as_deref(),
                server: server.as_deref(),
            };
            cmd_resolve(&config, &query, target, cli.compact).await?;
        }
        Commands::Tv {
            tmdb_id,
            season,
            episode,
            provider,
            server,
        } => {
            let query = MediaQuery::show(tmdb_id, season, episode)?;
            let target = Target {
                provider: provider.as_deref(),
                server: server.as_deref(),
            };
            cmd_resolve(&config, &query, target, cli.compact).await?;
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let resolver = Arc::new(Resolver::from_config(&config)?);
            reelsource::server::serve(resolver, &bind).await?;
        }
    }

    Ok(())
}

/// Where to resolve: provider and preferred embed.
struct Target<'a> {
    provider: Option<&'a str>,
    server: Option<&'a str>,
}

async fn cmd_resolve(
    config: &Config,
    query: &MediaQuery,
    target: Target<'_>,
    compact: bool,
) -> Result<()> {
    let resolver = Resolver::from_config(config)?;
    let result = resolver
        .resolve(query, target.provider, target.server)
        .await?;
    if result.is_empty() {
        tracing::warn!("No playable stream found");
    }

    let json = if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(())
}
