//! Availability cache implementation.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use domainforge_core::AvailabilityRecord;
use domainforge_rate_limit::AvailabilityConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the availability cache.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct AvailabilityCacheConfig {
    /// Freshness of confirmed answers (seconds)
    #[serde(default = "default_ttl")]
    #[builder(default = "default_ttl()")]
    ttl_secs: u64,

    /// Freshness of failed lookups (seconds)
    #[serde(default = "default_failure_ttl")]
    #[builder(default = "default_failure_ttl()")]
    failure_ttl_secs: u64,

    /// Maximum number of entries; unbounded when `None`
    #[serde(default)]
    #[builder(default)]
    max_entries: Option<usize>,
}

fn default_ttl() -> u64 {
    24 * 60 * 60
}

fn default_failure_ttl() -> u64 {
    5 * 60
}

impl Default for AvailabilityCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            failure_ttl_secs: default_failure_ttl(),
            max_entries: None,
        }
    }
}

impl From<&AvailabilityConfig> for AvailabilityCacheConfig {
    fn from(config: &AvailabilityConfig) -> Self {
        Self {
            ttl_secs: config.ttl_secs,
            failure_ttl_secs: config.failure_ttl_secs,
            max_entries: config.max_entries,
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<String, AvailabilityRecord>,
    access_order: Vec<String>,
}

impl Entries {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let k = self.access_order.remove(pos);
            self.access_order.push(k);
        }
    }

    fn forget(&mut self, key: &str) {
        self.records.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }
}

/// Cache of availability answers keyed by the exact domain string.
///
/// Entries expire at read time: a confirmed answer is fresh for `ttl_secs`,
/// a failed lookup for `failure_ttl_secs`. With `max_entries` set the least
/// recently used entry is evicted on overflow.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use domainforge_cache::{AvailabilityCache, AvailabilityCacheConfig};
/// use domainforge_core::AvailabilityRecord;
///
/// let cache = AvailabilityCache::new(AvailabilityCacheConfig::default());
/// cache.insert(AvailabilityRecord::confirmed("example.com", false, Utc::now()));
///
/// let hit = cache.get("example.com").unwrap();
/// assert!(!hit.is_available);
/// assert!(cache.get("Example.com").is_none());
/// ```
#[derive(Debug)]
pub struct AvailabilityCache {
    config: AvailabilityCacheConfig,
    entries: Mutex<Entries>,
}

impl AvailabilityCache {
    /// Create an empty cache.
    pub fn new(config: AvailabilityCacheConfig) -> Self {
        tracing::debug!(
            ttl_secs = config.ttl_secs,
            failure_ttl_secs = config.failure_ttl_secs,
            max_entries = ?config.max_entries,
            "Creating new AvailabilityCache"
        );
        Self {
            config,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Cache settings.
    pub fn config(&self) -> &AvailabilityCacheConfig {
        &self.config
    }

    fn ttl_for(&self, record: &AvailabilityRecord) -> Duration {
        let secs = if record.is_confirmed() {
            self.config.ttl_secs
        } else {
            self.config.failure_ttl_secs
        };
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Fresh record for `domain`, if any.
    pub fn get(&self, domain: &str) -> Option<AvailabilityRecord> {
        self.get_at(domain, Utc::now())
    }

    /// [`get`](Self::get) evaluated at a fixed instant.
    #[tracing::instrument(skip(self, now))]
    pub fn get_at(&self, domain: &str, now: DateTime<Utc>) -> Option<AvailabilityRecord> {
        let mut entries = self.entries.lock();

        let record = entries.records.get(domain)?;
        let age = now.signed_duration_since(record.checked_at);
        if age >= self.ttl_for(record) {
            tracing::debug!(age_secs = age.num_seconds(), "Cache entry expired, removing");
            entries.forget(domain);
            return None;
        }

        let record = record.clone();
        entries.touch(domain);
        tracing::debug!(outcome = %record.outcome, "Cache hit");
        Some(record)
    }

    /// Store a record under its domain name, replacing any previous one.
    #[tracing::instrument(skip(self, record), fields(domain = %record.domain_name, outcome = %record.outcome))]
    pub fn insert(&self, record: AvailabilityRecord) {
        let mut entries = self.entries.lock();
        let key = record.domain_name.clone();

        if let Some(max) = self.config.max_entries
            && max > 0
            && entries.records.len() >= max
            && !entries.records.contains_key(&key)
            && !entries.access_order.is_empty()
        {
            let oldest = entries.access_order.remove(0);
            tracing::debug!(domain = %oldest, "Evicting LRU entry");
            entries.records.remove(&oldest);
        }

        if let Some(pos) = entries.access_order.iter().position(|k| k == &key) {
            entries.access_order.remove(pos);
        }
        entries.access_order.push(key.clone());
        entries.records.insert(key, record);
    }

    /// Remove stale entries.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.records.len();

        let stale: Vec<String> = entries
            .records
            .iter()
            .filter(|(_, r)| now.signed_duration_since(r.checked_at) >= self.ttl_for(r))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            entries.forget(key);
        }

        let removed = before - entries.records.len();
        if removed > 0 {
            tracing::info!(removed, remaining = entries.records.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    /// Clear all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.records.len();
        entries.records.clear();
        entries.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Number of cached entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().records.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().records.is_empty()
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new(AvailabilityCacheConfig::default())
    }
}
