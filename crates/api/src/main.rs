//! Schedlink - scheduling-integration backend
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use schedlink_api::{router, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging FIRST so we can see .env loading
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "could not load .env file"),
    }

    let config = schedlink_infra::config::load_from_env()?;
    let bind_addr = config.bind_addr.clone();

    let ctx = Arc::new(AppContext::new(config)?);
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "schedlink listening");
    axum::serve(listener, app).await?;

    Ok(())
}
