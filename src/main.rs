use std::sync::Arc;

use recipe_vault_mcp::app::RecipeVault;
use recipe_vault_mcp::config::VaultConfig;
use recipe_vault_mcp::server::RecipeVaultMcpServer;
use recipe_vault_mcp::session::FileSessionStorage;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VaultConfig::from_env()?;
    tracing::info!("Using Recipe Vault API at {}", config.api_base_url);

    let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
    let vault = Arc::new(RecipeVault::new(config.clone(), storage)?);

    let restored = vault.session().restore();
    if !restored {
        if let Some(credentials) = config.credentials.clone() {
            tracing::info!("Logging in as {}...", credentials.username_or_email);
            if let Err(e) = vault.session().login(credentials).await {
                tracing::warn!("Startup login failed: {}", e);
                tracing::warn!("Please verify:");
                tracing::warn!("  - RECIPE_VAULT_API_URL is correct: {}", config.api_base_url);
                tracing::warn!("  - RECIPE_VAULT_USERNAME and RECIPE_VAULT_PASSWORD are correct");
                tracing::warn!("The server will continue without a session; use the login tool.");
            }
        }
    }

    // Make sure the API answers before accepting clients
    tracing::info!("Testing API access...");
    match vault.store().service().list_all().await {
        Ok(recipes) => {
            tracing::info!("API access test successful - found {} recipes", recipes.len());
        }
        Err(e) => {
            tracing::warn!("API access test failed: {}", e);
            tracing::warn!(
                "The server will continue, but tools may fail until the API is reachable."
            );
        }
    }

    let sse_config = SseServerConfig {
        bind: config.bind_addr.parse()?,
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: tokio_util::sync::CancellationToken::new(),
        sse_keep_alive: None,
    };

    tracing::info!("Recipe Vault MCP Server listening on {}", sse_config.bind);

    // serve_with_config handles binding, axum server setup, and graceful shutdown internally
    let sse_server = SseServer::serve_with_config(sse_config).await?;

    // Every connection shares the same vault, and with it the session
    let ct = sse_server.with_service(move || RecipeVaultMcpServer::new(vault.clone()));

    tracing::info!("Recipe Vault MCP Server started successfully");

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    ct.cancel();

    Ok(())
}
