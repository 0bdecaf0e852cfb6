use anyhow::{Context, Result};
use nba_predict::api::{create_router, AppState};
use nba_predict::config::{Config, CONFIG_PATH_ENV};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "nba_predict=info,tower_http=debug";

fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    Config::load_env_file();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let path = config_path();
    let config = if path.exists() {
        Config::load(&path)?
    } else {
        tracing::warn!("{} not found, using defaults", path.display());
        Config::parse("")?
    };

    let state = AppState::from_config(&config)?;
    tracing::info!(
        season = %state.season,
        base_url = %config.stats_api.base_url,
        cache_expiry_secs = config.cache.expiry_secs,
        "stats feed ready"
    );

    state
        .predictor
        .train_blocking()
        .await
        .context("initial model training failed")?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!("listening on {}", config.server.bind_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
