//! Cached availability checks.

use crate::{MAX_BATCH_SIZE, validate_domain_name};
use chrono::Utc;
use domainforge_cache::AvailabilityCache;
use domainforge_core::AvailabilityRecord;
use domainforge_error::{DomainforgeResult, NotConfiguredError, ValidationError};
use domainforge_interface::AvailabilityLookup;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Availability checks backed by a registry lookup and a time-boxed cache.
///
/// Lookup failures never surface as errors: they produce an unavailable
/// record marked `lookup_failed`, cached for the shorter failure TTL.
#[derive(Clone)]
pub struct AvailabilityChecker {
    lookup: Option<Arc<dyn AvailabilityLookup>>,
    cache: Arc<AvailabilityCache>,
}

impl std::fmt::Debug for AvailabilityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityChecker")
            .field("lookup", &self.lookup.as_ref().map(|l| l.provider_name()))
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl AvailabilityChecker {
    /// Create a checker. Without a lookup every check is a configuration error.
    pub fn new(lookup: Option<Arc<dyn AvailabilityLookup>>, cache: Arc<AvailabilityCache>) -> Self {
        Self { lookup, cache }
    }

    /// Whether a registry lookup is configured.
    pub fn is_configured(&self) -> bool {
        self.lookup.is_some()
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<AvailabilityCache> {
        &self.cache
    }

    fn lookup(&self) -> DomainforgeResult<&Arc<dyn AvailabilityLookup>> {
        match &self.lookup {
            Some(lookup) => Ok(lookup),
            None => Err(NotConfiguredError::new(
                "Domain availability API not configured",
            ))?,
        }
    }

    /// Availability of one domain, from cache when fresh.
    ///
    /// # Errors
    ///
    /// - Validation error for a malformed name
    /// - Not-configured error when no lookup exists (nothing is cached)
    #[instrument(skip(self))]
    pub async fn check(&self, domain: &str) -> DomainforgeResult<AvailabilityRecord> {
        if !validate_domain_name(domain) {
            Err(ValidationError::new("Invalid domain name format"))?
        }
        let lookup = self.lookup()?;
        Ok(self.check_with(lookup, domain).await)
    }

    /// Availability of up to ten domains, looked up concurrently.
    ///
    /// Failed lookups are left out of the result.
    ///
    /// # Errors
    ///
    /// Fails before any lookup when the batch is empty, has more than ten
    /// entries or contains a malformed name.
    #[instrument(skip(self, domains), fields(count = domains.len()))]
    pub async fn check_batch(&self, domains: &[String]) -> DomainforgeResult<Vec<AvailabilityRecord>> {
        validate_batch(domains)?;
        let lookup = self.lookup()?;

        let records = join_all(domains.iter().map(|d| self.check_with(lookup, d))).await;
        let total = records.len();
        let confirmed: Vec<AvailabilityRecord> =
            records.into_iter().filter(AvailabilityRecord::is_confirmed).collect();

        if confirmed.len() < total {
            warn!(
                failed = total - confirmed.len(),
                "Omitting failed lookups from batch"
            );
        }
        Ok(confirmed)
    }

    async fn check_with(
        &self,
        lookup: &Arc<dyn AvailabilityLookup>,
        domain: &str,
    ) -> AvailabilityRecord {
        if let Some(hit) = self.cache.get(domain) {
            debug!(domain, available = hit.is_available, "Cache hit");
            return hit;
        }

        let record = match lookup.is_available(domain).await {
            Ok(available) => AvailabilityRecord::confirmed(domain, available, Utc::now()),
            Err(e) => {
                warn!(domain, error = %e, "Availability lookup failed, reporting unavailable");
                AvailabilityRecord::failed(domain, Utc::now())
            }
        };

        self.cache.insert(record.clone());
        record
    }
}

/// Check batch size and every name before any lookup.
///
/// # Errors
///
/// Returns a validation error listing every problem found.
pub fn validate_batch(domains: &[String]) -> DomainforgeResult<()> {
    let mut issues = Vec::new();
    if domains.is_empty() {
        issues.push("At least one domain is required".to_string());
    }
    if domains.len() > MAX_BATCH_SIZE {
        issues.push(format!(
            "At most {} domains can be checked at once",
            MAX_BATCH_SIZE
        ));
    }
    if domains.iter().any(|d| !validate_domain_name(d)) {
        issues.push("Invalid domain name format".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::from_issues(issues))?
    }
}
