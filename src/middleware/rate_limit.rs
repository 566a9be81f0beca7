//! Rate limiting middleware
//!
//! Process-wide sliding-window throttle over mutating entry points, keyed by
//! caller identity plus action. State is in-memory only; a multi-instance
//! deployment degrades to looser effective limits rather than failing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::RateLimitPolicy;
use crate::utils::errors::{GatherlyError, Result};

/// Request timestamps for a single (identity, action) key
#[derive(Debug, Clone, Default)]
struct WindowEntry {
    timestamps: Vec<Instant>,
}

impl WindowEntry {
    /// Drop timestamps that have left the trailing window
    fn cleanup(&mut self, now: Instant, window: Duration) {
        self.timestamps.retain(|&t| now.duration_since(t) < window);
    }

    /// Seconds until the oldest timestamp exits the window
    fn retry_after_secs(&self, now: Instant, window: Duration) -> u64 {
        match self.timestamps.first() {
            Some(&oldest) => {
                let elapsed = now.duration_since(oldest);
                window.saturating_sub(elapsed).as_secs().max(1)
            }
            None => 0,
        }
    }
}

/// Sliding-window rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check a request against a policy, recording it when allowed.
    ///
    /// Fails closed with `RateLimited` carrying the retry-after seconds when
    /// the window is full.
    pub fn check(&self, identity: &str, action: &str, policy: RateLimitPolicy) -> Result<()> {
        let window = Duration::from_secs(policy.window_secs);
        let key = format!("{identity}:{action}");
        let now = Instant::now();

        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key).or_default();
        entry.cleanup(now, window);

        if entry.timestamps.len() < policy.limit as usize {
            entry.timestamps.push(now);
            debug!(identity = identity, action = action, "Rate limit check passed");
            Ok(())
        } else {
            let retry_after_secs = entry.retry_after_secs(now, window);
            warn!(
                identity = identity,
                action = action,
                retry_after_secs = retry_after_secs,
                "Rate limit exceeded"
            );
            Err(GatherlyError::RateLimited { retry_after_secs })
        }
    }

    /// Remove keys whose every timestamp has expired (should be called periodically)
    pub fn sweep(&self, max_window: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();

        entries.retain(|_, entry| {
            entry.cleanup(now, max_window);
            !entry.timestamps.is_empty()
        });

        debug!(remaining_keys = entries.len(), "Swept expired rate limit keys");
    }

    /// Number of tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn policy(limit: u32, window_secs: u64) -> RateLimitPolicy {
        RateLimitPolicy { limit, window_secs }
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        let p = policy(3, 30);

        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
        assert!(limiter.check("10.0.0.1", "join", p).is_err());
    }

    #[test]
    fn test_rejection_carries_retry_after_within_window() {
        let limiter = RateLimiter::new();
        let p = policy(3, 30);

        for _ in 0..3 {
            limiter.check("10.0.0.1", "join", p).unwrap();
        }

        let err = limiter.check("10.0.0.1", "join", p).unwrap_err();
        assert_matches!(err, GatherlyError::RateLimited { retry_after_secs } if retry_after_secs <= 30);
    }

    #[test]
    fn test_keys_are_scoped_by_identity_and_action() {
        let limiter = RateLimiter::new();
        let p = policy(1, 30);

        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
        // Different identity, same action
        assert!(limiter.check("10.0.0.2", "join", p).is_ok());
        // Same identity, different action
        assert!(limiter.check("10.0.0.1", "admin_manage", p).is_ok());
        // Same key again is over the limit
        assert!(limiter.check("10.0.0.1", "join", p).is_err());
    }

    #[test]
    fn test_sweep_drops_expired_keys() {
        let limiter = RateLimiter::new();
        let p = policy(5, 30);

        limiter.check("10.0.0.1", "join", p).unwrap();
        assert_eq!(limiter.tracked_keys(), 1);

        // With a zero-length window everything is already expired
        limiter.sweep(Duration::from_secs(0));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_window_expiry_readmits() {
        let limiter = RateLimiter::new();
        // Zero-length window: every prior timestamp is immediately stale
        let p = policy(1, 0);

        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
        assert!(limiter.check("10.0.0.1", "join", p).is_ok());
    }
}
