//! `mcpgate probe`: One health probe against the remote gateway.

use mcpgate_router::{AvailabilityProber, HttpRemoteGateway};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let url = config
        .remote
        .url
        .as_deref()
        .ok_or("No remote gateway URL configured (set MCP_SERVER_URL)")?;

    if !config.remote.enabled {
        println!("Note: the remote tier is disabled in config; probing anyway");
    }

    let gateway = Arc::new(HttpRemoteGateway::new(url)?);
    let prober = AvailabilityProber::new(gateway, config.remote.probe_timeout(), Duration::ZERO);

    if prober.probe().await {
        info!(url = %url, "Remote gateway reachable");
        println!("Remote gateway {url} is reachable");
        Ok(())
    } else {
        warn!(
            url = %url,
            timeout_ms = config.remote.probe_timeout_ms,
            "Remote gateway unreachable"
        );
        Err(format!(
            "Remote gateway {url} is unreachable (timeout {}ms)",
            config.remote.probe_timeout_ms
        )
        .into())
    }
}
