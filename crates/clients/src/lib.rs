//! Backend capability clients for mcpgate.
//!
//! All clients implement the `mcpgate_core::CapabilityClient` trait and are
//! used by the router when the remote gateway cannot serve a request.
//! [`build_registry`] registers a client for every backend that has
//! configuration.

mod http;
pub mod notion;
pub mod supabase;
pub mod youtube;

pub use notion::NotionClient;
pub use supabase::SupabaseClient;
pub use youtube::YoutubeTranscriptClient;

use mcpgate_config::AppConfig;
use mcpgate_core::{ClientError, ClientRegistry};
use std::sync::Arc;
use tracing::info;

/// Build a client registry from configuration.
pub fn build_registry(config: &AppConfig) -> Result<ClientRegistry, ClientError> {
    let mut registry = ClientRegistry::new();
    let timeout = config.router.client_timeout();

    if let Some(supabase) = &config.backends.supabase {
        registry.register(Arc::new(SupabaseClient::new(supabase, timeout)?));
    }

    if let Some(notion) = &config.backends.notion {
        registry.register(Arc::new(NotionClient::new(notion, timeout)?));
    }

    if config.backends.youtube.enabled {
        registry.register(Arc::new(YoutubeTranscriptClient::new(
            &config.backends.youtube,
            timeout,
        )?));
    }

    info!(services = ?registry.services(), "Capability clients registered");
    Ok(registry)
}
