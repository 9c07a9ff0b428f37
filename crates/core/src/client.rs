//! Capability client trait: the local adapter over one backend service.
//!
//! Each client implements a fixed set of named operations. The router only
//! ever sees the generic `(action, parameters)` shape; clients narrow the
//! parameters into typed structs on entry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ClientError;
use crate::request::{McpResponse, Parameters};

/// A local adapter implementing a fixed operation set against one backend.
///
/// Implementations must be stateless per call: a failed operation must not
/// affect any later operation.
#[async_trait]
pub trait CapabilityClient: Send + Sync {
    /// The service name this client answers for (e.g. "supabase").
    fn service(&self) -> &str;

    /// The actions this client implements.
    fn operations(&self) -> &[&'static str];

    /// Run `action`. Returns [`ClientError::Unsupported`] for an action not in
    /// [`operations`](Self::operations).
    async fn invoke(
        &self,
        action: &str,
        parameters: &Parameters,
    ) -> std::result::Result<McpResponse, ClientError>;

    fn supports(&self, action: &str) -> bool {
        self.operations().contains(&action)
    }

    /// Build the decline error for `action`.
    fn unsupported(&self, action: &str) -> ClientError {
        ClientError::Unsupported {
            service: self.service().to_string(),
            action: action.to_string(),
        }
    }
}

/// Deserialize an operation's typed parameters from the generic bag.
pub fn parse_parameters<T: DeserializeOwned>(
    action: &str,
    parameters: &Parameters,
) -> std::result::Result<T, ClientError> {
    serde_json::from_value(serde_json::Value::Object(parameters.clone()))
        .map_err(|e| ClientError::InvalidParameters(format!("{action}: {e}")))
}

/// Service name → client.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn CapabilityClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under its own service name. Replaces any existing client.
    pub fn register(&mut self, client: Arc<dyn CapabilityClient>) {
        let name = client.service().to_string();
        self.clients.insert(name, client);
    }

    pub fn get(&self, service: &str) -> Option<Arc<dyn CapabilityClient>> {
        self.clients.get(service).cloned()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.clients.contains_key(service)
    }

    /// Registered service names, sorted.
    pub fn services(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("services", &self.services())
            .finish()
    }
}
