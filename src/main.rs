//! Tavern Server — virtual tabletop backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tavern_core::config::AppConfig;
use tavern_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TAVERN_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Tavern v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db = tavern_database::DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    tavern_database::migration::run_migrations(db.pool()).await?;

    tracing::info!("Initializing cache (provider: {})...", config.cache.provider);
    let cache = Arc::new(tavern_cache::CacheManager::new(&config.cache).await?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = tavern_api::AppState::new(config, db.into_pool(), cache);
    let app = tavern_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "Tavern server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Resolve once a shutdown signal arrives.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to listen for shutdown signal");
        return std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
