//! Availability prober for the remote gateway.
//!
//! A probe is a single bounded health request. It never fails: any network
//! error, non-success status, or timeout reads as "unreachable". The latest
//! result is cached so that a dead gateway costs at most one probe timeout
//! per TTL window. Concurrent checks that find the state stale share a
//! single refresh.

use mcpgate_core::AvailabilityState;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::remote::RemoteGateway;

pub struct AvailabilityProber {
    remote: Arc<dyn RemoteGateway>,
    timeout: Duration,
    ttl: Duration,
    state: Mutex<Option<AvailabilityState>>,
    refresh: tokio::sync::Mutex<()>,
}

impl AvailabilityProber {
    /// `ttl` of zero disables caching: every [`check`](Self::check) probes.
    pub fn new(remote: Arc<dyn RemoteGateway>, timeout: Duration, ttl: Duration) -> Self {
        Self {
            remote,
            timeout,
            ttl,
            state: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Probe now and record the result.
    pub async fn probe(&self) -> bool {
        let reachable = match tokio::time::timeout(self.timeout, self.remote.health()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(url = %self.remote.base_url(), error = %e, "Remote gateway probe failed");
                false
            }
            Err(_) => {
                debug!(
                    url = %self.remote.base_url(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Remote gateway probe timed out"
                );
                false
            }
        };

        let previous = self.store(AvailabilityState::checked_now(reachable));
        if previous.map(|s| s.reachable) != Some(reachable) {
            if reachable {
                info!(url = %self.remote.base_url(), "Remote gateway is reachable");
            } else {
                warn!(url = %self.remote.base_url(), "Remote gateway is unreachable");
            }
        }
        reachable
    }

    /// Cached reachability if still fresh, otherwise a new probe.
    ///
    /// With a non-zero TTL at most one probe is in flight; callers arriving
    /// during it wait and reuse its result.
    pub async fn check(&self) -> bool {
        if self.ttl.is_zero() {
            return self.probe().await;
        }
        if let Some(reachable) = self.fresh() {
            return reachable;
        }

        let _refresh = self.refresh.lock().await;
        match self.fresh() {
            Some(reachable) => reachable,
            None => self.probe().await,
        }
    }

    fn fresh(&self) -> Option<bool> {
        self.state()
            .filter(|state| state.is_fresh(self.ttl))
            .map(|state| state.reachable)
    }

    /// The last recorded state, `None` before the first probe.
    pub fn state(&self) -> Option<AvailabilityState> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn base_url(&self) -> &str {
        self.remote.base_url()
    }

    /// Replace the state, returning the previous one.
    fn store(&self, state: AvailabilityState) -> Option<AvailabilityState> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(state)
    }

    /// Refresh the state on a fixed interval until the handle is aborted.
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.probe().await;
            }
        })
    }
}
