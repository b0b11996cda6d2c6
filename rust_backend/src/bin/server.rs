//! perfdash HTTP server binary.
//!
//! Loads configuration, builds the data source and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! # Fixture files in ./data, queue data from the center API (default)
//! cargo run --bin perfdash-server
//!
//! # In-memory data source
//! REPOSITORY_TYPE=local cargo run --bin perfdash-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `files` (default) or `local`
//! - `DATA_DIR`: Directory with `power.csv`, `metrics-data.json`, `user-jobs.json`
//! - `QUEUE_API_BASE_URL`: Upstream REST base URL, empty to read a queue fixture
//! - `QUEUE_API_RETRIES`: Retries for upstream queue fetches (default: 2)
//! - `RUST_LOG`: Log level (default: info)
//!
//! Settings from `perfdash.toml` apply first; environment variables win.

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use perfdash::http::{create_router, AppState};
use perfdash::services::QueueQuery;
use perfdash::sources::{
    spawn_refresher, DashboardConfig, SourceError, RepositoryFactory, ServerConfig,
    SourceConfig,
};

fn load_config() -> anyhow::Result<(ServerConfig, SourceConfig)> {
    let (mut server, mut source) = match DashboardConfig::from_default_location() {
        Ok(file) => {
            info!("Loaded perfdash.toml");
            (file.to_server_config(), file.to_source_config()?)
        }
        Err(SourceError::Config(msg)) if msg.starts_with("No perfdash.toml") => {
            info!("No perfdash.toml found, using defaults");
            (ServerConfig::default(), SourceConfig::default())
        }
        Err(e) => return Err(e.into()),
    };

    server.apply_env()?;
    source.apply_env()?;
    Ok((server, source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting perfdash HTTP server");

    let (server, source) = load_config()?;
    let repository = RepositoryFactory::create(&source)?;
    info!("Repository initialized ({})", source.repo_type.as_str());

    let state = AppState::with_cache(repository.clone(), source.cache.stale_after);

    match source.cache.refresh_interval {
        Some(interval) => {
            spawn_refresher(
                state.queue_cache.clone(),
                repository,
                QueueQuery::default(),
                interval,
            );
        }
        None => warn!("Background queue refresh disabled"),
    }

    let app = create_router(state);

    let addr: SocketAddr = server.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
