//! # mcpgate Router
//!
//! Resolves every `(service, action, parameters)` request through an ordered
//! tier list: remote gateway, then a local capability client, then a stub.
//! See [`GatewayRouter`] for the fallthrough rules.

pub mod dispatch;
pub mod prober;
pub mod remote;
pub mod stub;

pub use dispatch::{
    AttemptStatus, DispatchReport, GatewayRouter, INVALID_REQUEST, Tier, TierAttempt, TierOutcome,
};
pub use prober::AvailabilityProber;
pub use remote::{HttpRemoteGateway, RemoteGateway};

use mcpgate_config::AppConfig;
use mcpgate_core::{ClientRegistry, TransportError};
use std::sync::Arc;
use tracing::info;

/// Build a router from configuration and an already-built client registry.
///
/// The remote tier is wired only when `remote.enabled` is set and a URL is
/// configured.
pub fn build_from_config(
    config: &AppConfig,
    clients: ClientRegistry,
) -> Result<GatewayRouter, TransportError> {
    let router = GatewayRouter::new(clients).with_client_timeout(config.router.client_timeout());

    let Some(url) = config.remote.active_url() else {
        info!("Remote gateway tier disabled");
        return Ok(router);
    };

    let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpRemoteGateway::new(url)?);
    let prober = Arc::new(AvailabilityProber::new(
        gateway.clone(),
        config.remote.probe_timeout(),
        config.remote.probe_ttl(),
    ));
    info!(url = %url, "Remote gateway tier enabled");

    Ok(router.with_remote(gateway, prober, config.remote.timeout()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_remote_tier() {
        let router = build_from_config(&AppConfig::default(), ClientRegistry::new()).unwrap();
        assert_eq!(router.remote_url(), Some("http://localhost:8080"));
        assert!(router.prober().is_some());
    }

    #[test]
    fn disabled_remote_has_no_prober() {
        let mut config = AppConfig::default();
        config.remote.enabled = false;
        let router = build_from_config(&config, ClientRegistry::new()).unwrap();
        assert!(router.remote_url().is_none());
        assert!(router.prober().is_none());
    }
}
