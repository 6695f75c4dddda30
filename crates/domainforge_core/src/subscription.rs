//! Subscription records and billing state.

use crate::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of a subscription.
///
/// # Examples
///
/// ```
/// use domainforge_core::SubscriptionStatus;
///
/// assert_eq!(SubscriptionStatus::from_stripe("past_due"), SubscriptionStatus::PastDue);
/// assert_eq!(SubscriptionStatus::from_stripe("incomplete_expired"), SubscriptionStatus::Canceled);
/// assert!(SubscriptionStatus::Trialing.is_current());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    /// No subscription on record
    #[default]
    None,
    /// Paid and current
    Active,
    /// Canceled, possibly running until period end
    Canceled,
    /// Latest invoice failed
    PastDue,
    /// Retries exhausted
    Unpaid,
    /// In a trial period
    Trialing,
}

impl SubscriptionStatus {
    /// Statuses under which a subscription still counts as held by the user.
    pub const CURRENT: [SubscriptionStatus; 3] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trialing,
        SubscriptionStatus::PastDue,
    ];

    /// Whether the subscription is still held (active, trialing or past due).
    pub fn is_current(&self) -> bool {
        Self::CURRENT.contains(self)
    }

    /// Map a Stripe subscription status onto the local set.
    ///
    /// Stripe statuses without a local counterpart collapse onto the closest
    /// non-entitled state.
    pub fn from_stripe(status: &str) -> Self {
        match SubscriptionStatus::from_str(status) {
            Ok(s) => s,
            Err(_) => match status {
                "incomplete_expired" => SubscriptionStatus::Canceled,
                "incomplete" => SubscriptionStatus::PastDue,
                _ => SubscriptionStatus::Unpaid,
            },
        }
    }
}

/// Stored subscription row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Primary key
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Stripe customer id
    pub stripe_customer_id: Option<String>,
    /// Stripe subscription id
    pub stripe_subscription_id: Option<String>,
    /// Purchased tier
    pub tier: Tier,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// End of the current billing period
    pub current_period_end: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Values written when a checkout completes.
///
/// Upserts are keyed by `user_id`: an existing row for the user is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpsert {
    /// Owning user
    pub user_id: Uuid,
    /// Stripe customer id
    pub stripe_customer_id: Option<String>,
    /// Stripe subscription id
    pub stripe_subscription_id: Option<String>,
    /// Purchased tier
    pub tier: Tier,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// End of the current billing period
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Partial update applied to an existing subscription.
///
/// # Examples
///
/// ```
/// use domainforge_core::{SubscriptionStatus, SubscriptionUpdate};
///
/// let update = SubscriptionUpdate::status(SubscriptionStatus::Canceled);
/// assert!(update.tier.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    /// New status, if changing
    pub status: Option<SubscriptionStatus>,
    /// New tier, if changing
    pub tier: Option<Tier>,
    /// New period end, if changing
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionUpdate {
    /// Update touching only the status.
    pub fn status(status: SubscriptionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Update touching only the tier.
    pub fn tier(tier: Tier) -> Self {
        Self {
            tier: Some(tier),
            ..Default::default()
        }
    }
}

/// Tier and status as reported to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    /// Effective tier
    pub tier: Tier,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// End of the current billing period
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Default for SubscriptionSummary {
    fn default() -> Self {
        Self {
            tier: Tier::Free,
            status: SubscriptionStatus::None,
            current_period_end: None,
        }
    }
}

impl From<&Subscription> for SubscriptionSummary {
    fn from(sub: &Subscription) -> Self {
        Self {
            tier: sub.tier,
            status: sub.status,
            current_period_end: sub.current_period_end,
        }
    }
}
