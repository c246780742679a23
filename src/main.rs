use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use comic_image_proxy::{api, config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    config::Config::dotenv_load();
    let config = config::Config::new()?;
    config.print_env_vars();
    if config.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; /enhance-prompt will fail");
    }
    if config.replicate_api_token.is_none() {
        tracing::warn!("REPLICATE_API_TOKEN is not set; /generate-image will fail");
    }

    let state = Arc::new(api::routes::AppState::from_config(&config));
    let app = api::routes::router(state);

    // Run our application with safe parsing
    let ip: std::net::IpAddr = config.api_host.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 127.0.0.1", config.api_host);
        std::net::IpAddr::from([127, 0, 0, 1])
    });
    let port: u16 = config.api_port.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_PORT '{}', falling back to 8189", config.api_port);
        8189
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
