use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay_gateway::server;
use chat_relay_gateway::ChatRelayHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = chat_relay_core::Config::load()?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handler = ChatRelayHandler::from_config(&config)?;
    let profile = handler.profile();
    info!(
        "Configuration loaded (profile: {} -> {}, base url: {})",
        profile.name,
        profile.model,
        config.openai_base_url()
    );

    if config.openai_api_key().is_none() {
        warn!("OPENAI_API_KEY is not set; chat requests will fail until it is configured");
    }

    // Security: Verify localhost-only binding
    if config.settings.gateway.host != "127.0.0.1" && config.settings.gateway.host != "localhost" {
        warn!(
            "Gateway binding to non-localhost address: {}. This exposes the relay to remote access.",
            config.settings.gateway.host
        );
    }

    let bind_addr = config.bind_addr();
    info!("Starting chat relay on {}", bind_addr);

    server::run(Arc::new(handler), &bind_addr).await
}
