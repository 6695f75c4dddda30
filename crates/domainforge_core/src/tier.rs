//! Subscription tiers.

use serde::{Deserialize, Serialize};

/// Subscription level determining quota and model quality.
///
/// # Examples
///
/// ```
/// use domainforge_core::Tier;
/// use std::str::FromStr;
///
/// assert_eq!(Tier::from_str("premium").unwrap(), Tier::Premium);
/// assert_eq!(Tier::Mid.to_string(), "mid");
/// assert!(!Tier::Free.is_paid());
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    /// No subscription
    #[default]
    Free,
    /// Entry paid plan
    Mid,
    /// Top paid plan
    Premium,
}

impl Tier {
    /// Whether the tier is backed by a paid subscription.
    pub fn is_paid(&self) -> bool {
        matches!(self, Tier::Mid | Tier::Premium)
    }
}
