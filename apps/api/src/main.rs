mod auth;
mod config;
mod db;
mod errors;
mod github_client;
mod goals;
mod models;
mod routes;
mod state;
mod stats;
mod sync;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::github_client::GithubClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sync::scheduler::spawn_sync_loop;
use crate::sync::store::PgSyncStore;
use crate::sync::SyncPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Evergreeners API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize GitHub client
    let github = GithubClient::new(
        &config.github_graphql_url,
        &config.github_api_url,
        config.github_timeout,
    )
    .context("failed to build GitHub HTTP client")?;
    info!(
        "GitHub client initialized (timeout {}s)",
        config.github_timeout.as_secs()
    );

    let sync = SyncPipeline::new(Arc::new(github), Arc::new(PgSyncStore::new(db.clone())));

    // Hourly batch sync of every connected user
    spawn_sync_loop(sync.clone(), config.sync_interval, config.sync_concurrency);

    let cors = build_cors(&config.allowed_origins)?;

    let state = AppState {
        db,
        sync,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Credentialed CORS for the known frontend origins.
fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid origin in ALLOWED_ORIGINS: '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE]))
}
