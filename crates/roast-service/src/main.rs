//! Roast service - compares two GitHub users with a generative model

use github_api::{GithubClient, GithubOptions};
use roast_service::cache::LookupCache;
use roast_service::directory::Lookups;
use roast_service::generator::{select_backend, CommentaryGenerator};
use roast_service::server::{cors_layer, start_server, ServerState, SharedState};
use roast_service::{Comparator, Config, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("roast_service=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_stackdriver::layer())
        .init();

    info!("Starting roast service...");

    let config = Config::from_env()?;
    info!(port = config.port, ttl_secs = config.cache_ttl.as_secs(), "Configuration loaded");

    let github = GithubClient::new(GithubOptions {
        base_url: config.github_api_url.clone(),
        token: config.github_token.clone(),
        ..Default::default()
    })?;
    if config.github_token.is_none() {
        info!("GITHUB_TOKEN not set, using unauthenticated GitHub rate limits");
    }

    let lookups = Lookups::new(LookupCache::new(config.cache_ttl), Arc::new(github));
    let generator = CommentaryGenerator::new(select_backend(&config)?);

    let state: SharedState = Arc::new(ServerState::new(Comparator::new(lookups, generator)));

    // Start HTTP server (blocking)
    start_server(state, config.port, cors_layer(&config.cors_origins)).await?;

    Ok(())
}
