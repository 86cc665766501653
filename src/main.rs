use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use workspace_admin::app::{app, state_from_config};
use workspace_admin::config::{self, Backend};
use workspace_admin::invalidation::log_invalidations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Workspace Admin API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if workspace_admin::is_production!() && config.database.backend == Backend::Memory {
        anyhow::bail!("the in-memory database backend cannot be used in production");
    }

    let (state, revalidator) = state_from_config(Arc::new(config.clone())).await?;

    // Surface invalidations in the log until a cache layer subscribes
    let invalidations = revalidator.subscribe();
    tokio::spawn(log_invalidations(invalidations));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Workspace Admin API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
