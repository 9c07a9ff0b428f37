//! Error types for the mcpgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each tier of the router has its own error enum; none of them ever
//! reaches the caller as a fault. The router turns them into response data.

use thiserror::Error;

/// The top-level error type for mcpgate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    // --- Remote gateway tier ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Capability client tier ---
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A malformed request. Surfaced immediately, no tier is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("service must be a non-empty string")]
    MissingService,

    #[error("action must be a non-empty string")]
    MissingAction,
}

/// The remote gateway was unreachable or misbehaved.
///
/// Always recovered locally by falling through to the next tier.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Remote gateway returned status {status_code}: {body}")]
    Status { status_code: u16, body: String },

    #[error("Remote gateway returned a malformed body: {0}")]
    MalformedBody(String),

    #[error("Remote gateway is disabled")]
    Disabled,
}

/// A capability client operation failed or declined.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The client has no operation for this action. The router treats this
    /// as a decline and moves on to the stub tier.
    #[error("Unsupported action '{action}' for service '{service}'")]
    Unsupported { service: String, action: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Client not configured: {0}")]
    NotConfigured(String),

    #[error("Backend request failed: {message} (status: {status_code})")]
    Backend { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation '{action}' timed out after {timeout_ms}ms")]
    Timeout { action: String, timeout_ms: u64 },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether the client declined the action rather than failing it.
    pub fn is_decline(&self) -> bool {
        matches!(self, ClientError::Unsupported { .. })
    }
}
