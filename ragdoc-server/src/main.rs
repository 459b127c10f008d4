use std::sync::Arc;

use ragdoc::{RagConfig, RagService};
use ragdoc_server::{ServerConfig, run_server};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = RagConfig::from_env()?;
    let service = Arc::new(RagService::from_config(config)?);

    // Initialize eagerly so the first query is fast, but keep serving even
    // if the index is not ready yet; POST /api/initialize retries.
    match service.initialize().await {
        Ok(message) => info!(%message, "system ready"),
        Err(e) => warn!(error = %e, "system not ready; POST /api/initialize after adding documents"),
    }

    let host = std::env::var("RAGDOC_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("RAGDOC_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(5000);

    run_server(service, ServerConfig { host, port }).await
}
