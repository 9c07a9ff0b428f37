//! `mcpgate serve`: Start the HTTP gateway.

use std::path::Path;
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("mcpgate gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    match config.remote.active_url() {
        Some(url) => println!("   Remote:    {url}"),
        None => println!("   Remote:    disabled"),
    }

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        remote = config.remote.active_url().unwrap_or("disabled"),
        "Starting mcpgate gateway"
    );
    mcpgate_gateway::start(config).await?;

    Ok(())
}
