//! # mcpgate Core
//!
//! Domain types, traits, and error definitions for the mcpgate request router.
//! This crate has **no HTTP dependencies**: it defines the request/response
//! envelope, the capability-client seam, and the filter model that the
//! router and backend clients implement against.
//!
//! ## Layout
//!
//! - [`request`]: the `(service, action, parameters)` request and the
//!   schema-free response mapping
//! - [`client`]: the `CapabilityClient` trait and its registry
//! - [`filter`]: generic filter expressions and their predicate translation
//! - [`availability`]: the cached remote-gateway reachability snapshot
//! - [`error`]: the error taxonomy shared by every tier

pub mod availability;
pub mod client;
pub mod error;
pub mod filter;
pub mod request;

// Re-export key types at crate root for ergonomics
pub use availability::AvailabilityState;
pub use client::{CapabilityClient, ClientRegistry, parse_parameters};
pub use error::{ClientError, Error, RequestError, Result, TransportError};
pub use filter::{FilterExpression, FilterOp, Predicate};
pub use request::{ActionBody, McpRequest, McpResponse, Parameters};
