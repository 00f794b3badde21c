//! HTTP front end.
//!
//! Per-provider JSON routes:
//!
//! - `GET /` banner with the enabled providers
//! - `GET /{provider}` intro
//! - `GET /{provider}/watch-movie?tmdbId=…`
//! - `GET /{provider}/watch-tv?tmdbId=…&season=…&episode=…`
//!
//! Both watch routes take an optional `server=<embedId>` naming the embed
//! to try first.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ResolveError;
use crate::media::{MediaKind, MediaQuery};
use crate::pipeline::Resolver;
use crate::stream::ResolutionResult;

/// Message shown to clients for any pipeline failure.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    providers: Arc<[String]>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        let providers = resolver.providers().into();
        Self {
            resolver,
            providers,
        }
    }

    fn ensure_provider(&self, provider: &str) -> Result<(), ApiError> {
        if self.providers.iter().any(|p| p == provider) {
            Ok(())
        } else {
            Err(ApiError::UnknownProvider(provider.to_string()))
        }
    }
}

/// Watch route parameters. Unknown parameters such as `proxied` are
/// accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchQuery {
    pub tmdb_id: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub server: Option<String>,
}

impl WatchQuery {
    /// Preferred embed id; blank counts as absent.
    fn server(&self) -> Option<&str> {
        self.server.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug)]
pub enum ApiError {
    UnknownProvider(String),
    Resolve(ResolveError),
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::UnknownProvider(provider) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("unknown provider '{provider}'") })),
            )
                .into_response(),
            Self::Resolve(err) if err.is_client_error() => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": err.to_string() })),
            )
                .into_response(),
            Self::Resolve(err) => {
                error!(kind = err.kind(), error = %err, "Resolution failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "message": GENERIC_FAILURE,
                        "errorKind": err.kind(),
                        "detail": err.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Build the router around a shared resolver.
pub fn router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/{provider}", get(intro))
        .route("/{provider}/watch-movie", get(watch_movie))
        .route("/{provider}/watch-tv", get(watch_tv))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(resolver))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(resolver: Arc<Resolver>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;

    info!(addr = %local, providers = ?resolver.providers(), "Listening");

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("server error")
}

async fn banner(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("reelsource {}", crate::VERSION),
        "providers": &*state.providers,
    }))
}

async fn intro(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.ensure_provider(&provider)?;
    Ok(Json(json!({
        "intro": format!("Welcome to the {provider} provider"),
        "routes": "/watch-movie /watch-tv",
    })))
}

async fn watch_movie(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<WatchQuery>,
) -> Result<Json<ResolutionResult>, ApiError> {
    state.ensure_provider(&provider)?;
    let query = MediaQuery::from_raw(MediaKind::Movie, params.tmdb_id.as_deref(), None, None)?;
    let result = state
        .resolver
        .resolve(&query, Some(&provider), params.server())
        .await?;
    Ok(Json(result))
}

async fn watch_tv(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<WatchQuery>,
) -> Result<Json<ResolutionResult>, ApiError> {
    state.ensure_provider(&provider)?;
    let query = MediaQuery::from_raw(
        MediaKind::Show,
        params.tmdb_id.as_deref(),
        params.season.as_deref(),
        params.episode.as_deref(),
    )?;
    let result = state
        .resolver
        .resolve(&query, Some(&provider), params.server())
        .await?;
    Ok(Json(result))
}
