//! Monthly usage counters.

use crate::{TiersConfig, UsageLimit};
use chrono::{DateTime, Utc};
use domainforge_core::Tier;
use domainforge_error::{DomainforgeResult, QuotaError, QuotaErrorKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Year-month window key for a timestamp, e.g. `2025-08`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use domainforge_rate_limit::window_key;
///
/// let at = Utc.with_ymd_and_hms(2025, 8, 31, 23, 59, 59).unwrap();
/// assert_eq!(window_key(at), "2025-08");
/// ```
pub fn window_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UsageCounter {
    count: u32,
    window_key: String,
}

/// In-memory monthly generation counters keyed by caller identity.
///
/// Counters are created lazily and reset when the window rolls over. Nothing
/// is persisted, so a restart clears every quota, and each process keeps its
/// own counts.
#[derive(Debug)]
pub struct UsageLedger {
    tiers: TiersConfig,
    counters: Mutex<HashMap<String, UsageCounter>>,
}

impl UsageLedger {
    /// Create an empty ledger enforcing the given tier limits.
    pub fn new(tiers: TiersConfig) -> Self {
        Self {
            tiers,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Limits this ledger enforces.
    pub fn tiers(&self) -> &TiersConfig {
        &self.tiers
    }

    /// Count one call for `identifier` if the tier allows it.
    ///
    /// Returns `false` without touching the counter when the limit is reached.
    pub fn check_and_increment(&self, identifier: &str, tier: Tier) -> bool {
        self.check_and_increment_at(identifier, tier, Utc::now())
    }

    /// [`check_and_increment`](Self::check_and_increment) at a fixed instant.
    pub fn check_and_increment_at(&self, identifier: &str, tier: Tier, now: DateTime<Utc>) -> bool {
        let limit = match self.tiers.limit(tier) {
            UsageLimit::Unlimited => return true,
            UsageLimit::Limited(limit) => limit,
        };

        let key = window_key(now);
        let mut counters = self.counters.lock();
        let counter = counters
            .entry(identifier.to_string())
            .or_insert_with(|| UsageCounter {
                count: 0,
                window_key: key.clone(),
            });

        if counter.window_key != key {
            counter.count = 0;
            counter.window_key = key;
        }

        if counter.count >= limit {
            return false;
        }

        counter.count += 1;
        true
    }

    /// Count one call or fail with a quota error.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaErrorKind::MonthlyLimitReached`] when the caller is at
    /// their tier's limit.
    #[instrument(skip(self, tier), fields(tier = %tier))]
    pub fn enforce(&self, identifier: &str, tier: Tier) -> DomainforgeResult<()> {
        if self.check_and_increment(identifier, tier) {
            debug!(usage = self.usage(identifier), "Usage counted");
            return Ok(());
        }

        let limit = match self.tiers.limit(tier) {
            UsageLimit::Limited(limit) => limit,
            UsageLimit::Unlimited => u32::MAX,
        };
        warn!(limit, "Monthly usage limit reached");
        Err(QuotaError::new(QuotaErrorKind::MonthlyLimitReached {
            tier: tier.to_string(),
            limit,
        }))?
    }

    /// Calls counted for `identifier` in the current window.
    pub fn usage(&self, identifier: &str) -> u32 {
        self.usage_at(identifier, Utc::now())
    }

    /// [`usage`](Self::usage) at a fixed instant.
    pub fn usage_at(&self, identifier: &str, now: DateTime<Utc>) -> u32 {
        let key = window_key(now);
        self.counters
            .lock()
            .get(identifier)
            .filter(|c| c.window_key == key)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Forget the counter for `identifier`.
    pub fn reset(&self, identifier: &str) {
        self.counters.lock().remove(identifier);
    }

    /// Number of identities tracked.
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    /// Whether no identity has been counted yet.
    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }
}
