use std::sync::Arc;

use anyhow::Context;
use blog_api_rust::config::{self, AppConfig};
use blog_api_rust::database::{BlogStore, DatabaseManager, MemoryStore, PgStore};
use blog_api_rust::{app, is_production, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    // Refuses to start on a missing secret or out-of-range security settings
    let config = config::config()?.clone();
    tracing::info!("Starting Blog API in {:?} mode", config.environment);

    let store = build_store(&config).await?;

    tokio::fs::create_dir_all(&config.api.uploads_dir)
        .await
        .with_context(|| format!("failed to create uploads dir {}", config.api.uploads_dir.display()))?;

    let bind_addr = config.bind_addr();
    let router = app(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Blog API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None if is_production!() => anyhow::bail!("DATABASE_URL must be set in production"),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
