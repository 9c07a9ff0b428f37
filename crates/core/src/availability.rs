//! Cached reachability of the remote gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of the most recent health probe. Rebuilt on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityState {
    pub reachable: bool,
    pub last_checked: DateTime<Utc>,
}

impl AvailabilityState {
    /// A state checked just now.
    pub fn checked_now(reachable: bool) -> Self {
        Self {
            reachable,
            last_checked: Utc::now(),
        }
    }

    /// Whether this snapshot is younger than `ttl` at instant `now`.
    pub fn is_fresh_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        if ttl.is_zero() {
            return false;
        }
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.last_checked) < ttl,
            Err(_) => true,
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_is_never_fresh() {
        let state = AvailabilityState::checked_now(true);
        assert!(!state.is_fresh(Duration::ZERO));
    }

    #[test]
    fn freshness_expires() {
        let state = AvailabilityState::checked_now(false);
        let later = state.last_checked + chrono::Duration::seconds(10);
        assert!(state.is_fresh_at(Duration::from_secs(30), later));
        assert!(!state.is_fresh_at(Duration::from_secs(5), later));
    }
}
