//! Availability lookup results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an availability answer was obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupOutcome {
    /// The registry status API answered
    Confirmed,
    /// The lookup failed; the record reports unavailable
    LookupFailed,
}

/// Availability of one domain name at a point in time.
///
/// # Examples
///
/// ```
/// use domainforge_core::AvailabilityRecord;
/// use chrono::Utc;
///
/// let record = AvailabilityRecord::failed("example.com", Utc::now());
/// assert!(!record.is_available);
/// assert!(!record.is_confirmed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    /// Domain exactly as requested
    pub domain_name: String,
    /// Whether the name can be registered
    pub is_available: bool,
    /// How the answer was obtained
    #[serde(skip_serializing)]
    #[serde(default = "default_outcome")]
    pub outcome: LookupOutcome,
    /// Lookup timestamp
    pub checked_at: DateTime<Utc>,
}

fn default_outcome() -> LookupOutcome {
    LookupOutcome::Confirmed
}

impl AvailabilityRecord {
    /// Record for an answered lookup.
    pub fn confirmed(domain: impl Into<String>, is_available: bool, at: DateTime<Utc>) -> Self {
        Self {
            domain_name: domain.into(),
            is_available,
            outcome: LookupOutcome::Confirmed,
            checked_at: at,
        }
    }

    /// Fail-closed record for a lookup that did not complete.
    pub fn failed(domain: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            domain_name: domain.into(),
            is_available: false,
            outcome: LookupOutcome::LookupFailed,
            checked_at: at,
        }
    }

    /// Whether the registry answered.
    pub fn is_confirmed(&self) -> bool {
        self.outcome == LookupOutcome::Confirmed
    }
}
