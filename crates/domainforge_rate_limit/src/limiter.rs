//! Fixed-window per-key request limiter.

use crate::WindowConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Table size at which elapsed windows are swept.
pub const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted; `remaining` more fit in the window
    Allowed {
        /// Requests left in the window
        remaining: u32,
    },
    /// Request rejected until the window resets
    Limited {
        /// Seconds until the window resets
        retry_after_secs: u64,
    },
}

impl RateLimitDecision {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Counts requests per key in fixed windows.
///
/// A window opens at a key's first request and lasts `window`; the count
/// resets once the window has elapsed.
///
/// # Examples
///
/// ```
/// use domainforge_rate_limit::IpRateLimiter;
/// use std::time::Duration;
///
/// let limiter = IpRateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.check("10.0.0.1").is_allowed());
/// assert!(limiter.check("10.0.0.1").is_allowed());
/// assert!(!limiter.check("10.0.0.1").is_allowed());
/// assert!(limiter.check("10.0.0.2").is_allowed());
/// ```
#[derive(Debug)]
pub struct IpRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl IpRateLimiter {
    /// Create a limiter admitting `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Requests admitted per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count a request for `key`.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// [`check`](Self::check) at a fixed instant.
    ///
    /// Elapsed windows are swept whenever a new key arrives and the table
    /// holds at least [`PRUNE_THRESHOLD`] keys.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock();

        if windows.len() >= PRUNE_THRESHOLD && !windows.contains_key(key) {
            windows.retain(|_, w| now <= w.reset_at);
        }

        let fresh = Window {
            count: 0,
            reset_at: now + self.window,
        };
        let w = windows.entry(key.to_string()).or_insert(fresh);
        if now > w.reset_at {
            *w = fresh;
        }

        if w.count >= self.max_requests {
            let wait = w.reset_at.saturating_duration_since(now);
            return RateLimitDecision::Limited {
                retry_after_secs: wait.as_secs().max(1),
            };
        }
        w.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - w.count,
        }
    }

    /// Number of keys currently holding a window.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}
