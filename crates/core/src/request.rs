//! Request and response envelopes.
//!
//! A request names a backend `service`, an opaque `action` verb, and an
//! untyped parameter bag. A response is a schema-free JSON object; failures
//! are carried in an `error` field rather than raised.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// The open key-value bag passed through to every tier.
pub type Parameters = Map<String, Value>;

/// A single `(service, action, parameters)` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRequest {
    /// Target backend (e.g. "supabase", "youtube")
    pub service: String,

    /// Verb interpreted by the target service (e.g. "read_records")
    pub action: String,

    /// Action arguments
    #[serde(default)]
    pub parameters: Parameters,
}

impl McpRequest {
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            parameters: Parameters::new(),
        }
    }

    /// Replace the parameter bag.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Check that `service` and `action` are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.service.trim().is_empty() {
            return Err(RequestError::MissingService);
        }
        if self.action.trim().is_empty() {
            return Err(RequestError::MissingAction);
        }
        Ok(())
    }

    /// The wire body sent to `POST {gateway}/{service}`.
    pub fn body(&self) -> ActionBody {
        ActionBody {
            action: self.action.clone(),
            parameters: Some(self.parameters.clone()),
        }
    }
}

/// The `{action, parameters}` body shared by the inbound surface and the
/// remote gateway protocol. The service travels in the URL path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionBody {
    #[serde(default)]
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl ActionBody {
    /// Combine with the path's service name into a request.
    pub fn into_request(self, service: impl Into<String>) -> McpRequest {
        McpRequest {
            service: service.into(),
            action: self.action,
            parameters: self.parameters.unwrap_or_default(),
        }
    }
}

/// A schema-free response mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct McpResponse(Map<String, Value>);

impl McpResponse {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// `{error: <message>}`
    pub fn error(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("error".into(), Value::String(message.into()));
        Self(map)
    }

    /// `{data: [], error: <message>}`, the envelope for a failed client operation.
    pub fn client_failure(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("data".into(), Value::Array(Vec::new()));
        map.insert("error".into(), Value::String(message.into()));
        Self(map)
    }

    /// Build from an arbitrary JSON value. Only objects are responses.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Add a field, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `error` field, if this response carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for McpResponse {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
