//! Gateway router: tiered dispatch with explicit fallthrough.
//!
//! Tiers are tried in a fixed order and the first one that serves wins:
//!
//! 1. **Remote**: the remote gateway, if enabled and the prober says it is
//!    reachable. Transport errors and timeouts fall through; no retry.
//! 2. **Client**: the capability client registered for the service. A
//!    decline (unknown action) falls through; any other failure is final and
//!    becomes `{data: [], error}`.
//! 3. **Stub**: deterministic canned response. Always serves.
//!
//! Dispatch never fails. Every outcome, including a malformed request, is a
//! response.

use mcpgate_core::{ClientError, ClientRegistry, McpRequest, McpResponse, TransportError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::prober::AvailabilityProber;
use crate::remote::RemoteGateway;
use crate::stub;

/// Response returned for a request missing `service` or `action`.
pub const INVALID_REQUEST: &str = "invalid request";

/// Fixed evaluation order.
const TIER_ORDER: [Tier; 3] = [Tier::Remote, Tier::Client, Tier::Stub];

/// One source of responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Client,
    Stub,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Remote => "remote",
            Tier::Client => "client",
            Tier::Stub => "stub",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single tier did with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// The tier produced the final response.
    Served(McpResponse),
    /// The tier did not apply (disabled, unreachable, unregistered, declined).
    Skipped(String),
    /// The tier was attempted and failed; the next tier is tried.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Served,
    Skipped,
    Failed,
}

/// Trace entry for one tier evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct TierAttempt {
    pub tier: Tier,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub elapsed_ms: u64,
}

/// The response plus how it was produced.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub request_id: Uuid,
    pub response: McpResponse,
    /// `None` when the request was rejected before any tier ran.
    pub served_by: Option<Tier>,
    pub attempts: Vec<TierAttempt>,
}

impl DispatchReport {
    pub fn is_rejected(&self) -> bool {
        self.served_by.is_none()
    }

    /// Whether `tier` was evaluated at all (served, skipped or failed).
    pub fn attempted(&self, tier: Tier) -> bool {
        self.attempts.iter().any(|a| a.tier == tier)
    }
}

struct RemoteTier {
    gateway: Arc<dyn RemoteGateway>,
    prober: Arc<AvailabilityProber>,
    timeout: Duration,
}

/// Routes `(service, action, parameters)` requests across the tiers.
pub struct GatewayRouter {
    remote: Option<RemoteTier>,
    clients: ClientRegistry,
    client_timeout: Duration,
}

impl GatewayRouter {
    /// A router with only the client and stub tiers.
    pub fn new(clients: ClientRegistry) -> Self {
        Self {
            remote: None,
            clients,
            client_timeout: Duration::from_secs(10),
        }
    }

    /// Enable the remote tier.
    pub fn with_remote(
        mut self,
        gateway: Arc<dyn RemoteGateway>,
        prober: Arc<AvailabilityProber>,
        timeout: Duration,
    ) -> Self {
        self.remote = Some(RemoteTier {
            gateway,
            prober,
            timeout,
        });
        self
    }

    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn prober(&self) -> Option<&Arc<AvailabilityProber>> {
        self.remote.as_ref().map(|r| &r.prober)
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.gateway.base_url())
    }

    /// Dispatch a request and return only the response.
    pub async fn dispatch(&self, request: McpRequest) -> McpResponse {
        self.dispatch_report(request).await.response
    }

    /// Dispatch a request and return the response with its tier trace.
    pub async fn dispatch_report(&self, request: McpRequest) -> DispatchReport {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "dispatch",
            %request_id,
            service = %request.service,
            action = %request.action
        );
        self.run(request_id, request).instrument(span).await
    }

    async fn run(&self, request_id: Uuid, request: McpRequest) -> DispatchReport {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Rejecting malformed request");
            return DispatchReport {
                request_id,
                response: McpResponse::error(INVALID_REQUEST),
                served_by: None,
                attempts: Vec::new(),
            };
        }

        let mut attempts = Vec::with_capacity(TIER_ORDER.len());
        for tier in TIER_ORDER {
            let started = Instant::now();
            let outcome = self.attempt(tier, &request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let (status, reason, served) = match outcome {
                TierOutcome::Served(response) => (AttemptStatus::Served, None, Some(response)),
                TierOutcome::Skipped(reason) => {
                    debug!(%tier, reason = %reason, "Tier skipped");
                    (AttemptStatus::Skipped, Some(reason), None)
                }
                TierOutcome::Failed(reason) => {
                    warn!(%tier, error = %reason, "Tier failed, trying next");
                    (AttemptStatus::Failed, Some(reason), None)
                }
            };
            attempts.push(TierAttempt {
                tier,
                status,
                reason,
                elapsed_ms,
            });

            if let Some(response) = served {
                info!(%tier, elapsed_ms, error = response.is_error(), "Request served");
                return DispatchReport {
                    request_id,
                    response,
                    served_by: Some(tier),
                    attempts,
                };
            }
        }

        // The stub tier always serves; this keeps dispatch total regardless.
        DispatchReport {
            request_id,
            response: stub::respond(&request),
            served_by: Some(Tier::Stub),
            attempts,
        }
    }

    /// Evaluate a single tier.
    pub async fn attempt(&self, tier: Tier, request: &McpRequest) -> TierOutcome {
        match tier {
            Tier::Remote => self.attempt_remote(request).await,
            Tier::Client => self.attempt_client(request).await,
            Tier::Stub => TierOutcome::Served(stub::respond(request)),
        }
    }

    async fn attempt_remote(&self, request: &McpRequest) -> TierOutcome {
        let Some(remote) = &self.remote else {
            return TierOutcome::Skipped(TransportError::Disabled.to_string());
        };

        if !remote.prober.check().await {
            return TierOutcome::Skipped(format!(
                "remote gateway {} unreachable",
                remote.gateway.base_url()
            ));
        }

        match tokio::time::timeout(remote.timeout, remote.gateway.call(request)).await {
            Ok(Ok(response)) => TierOutcome::Served(response),
            Ok(Err(e)) => TierOutcome::Failed(e.to_string()),
            Err(_) => TierOutcome::Failed(
                TransportError::Timeout {
                    timeout_ms: remote.timeout.as_millis() as u64,
                }
                .to_string(),
            ),
        }
    }

    async fn attempt_client(&self, request: &McpRequest) -> TierOutcome {
        let Some(client) = self.clients.get(&request.service) else {
            return TierOutcome::Skipped(format!(
                "no client registered for '{}'",
                request.service
            ));
        };

        let result = tokio::time::timeout(
            self.client_timeout,
            client.invoke(&request.action, &request.parameters),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ClientError::Timeout {
                action: request.action.clone(),
                timeout_ms: self.client_timeout.as_millis() as u64,
            })
        });

        match result {
            Ok(response) => TierOutcome::Served(response),
            Err(e) if e.is_decline() => TierOutcome::Skipped(e.to_string()),
            Err(e) => {
                warn!(service = %request.service, error = %e, "Capability client failed");
                TierOutcome::Served(McpResponse::client_failure(e.to_string()))
            }
        }
    }
}
