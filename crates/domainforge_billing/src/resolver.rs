//! Subscription tier lookup for quota enforcement.

use domainforge_core::{Subscription, SubscriptionStatus, Tier};
use domainforge_interface::SubscriptionRepository;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Determines the tier a caller is entitled to.
///
/// Only an `active` subscription on a paid tier counts. Anything else,
/// including a failed lookup, resolves to [`Tier::Free`].
#[derive(Clone)]
pub struct TierResolver {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl std::fmt::Debug for TierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierResolver").finish_non_exhaustive()
    }
}

impl TierResolver {
    /// Create a resolver over a subscription store.
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Tier for a user id, falling back to email when no id is known.
    pub async fn resolve(&self, user_id: Option<Uuid>, email: Option<&str>) -> Tier {
        let lookup = match (user_id, email) {
            (Some(id), _) => self.subscriptions.latest_for_user(id).await,
            (None, Some(email)) => self.subscriptions.latest_for_email(email).await,
            (None, None) => return Tier::Free,
        };

        match lookup {
            Ok(sub) => {
                let tier = entitled_tier(sub.as_ref());
                debug!(%tier, "Resolved tier");
                tier
            }
            Err(e) => {
                warn!(error = %e, "Tier lookup failed, treating caller as free");
                Tier::Free
            }
        }
    }
}

/// Tier granted by a stored subscription.
///
/// # Examples
///
/// ```
/// use domainforge_billing::entitled_tier;
/// use domainforge_core::Tier;
///
/// assert_eq!(entitled_tier(None), Tier::Free);
/// ```
pub fn entitled_tier(subscription: Option<&Subscription>) -> Tier {
    match subscription {
        Some(sub) if sub.status == SubscriptionStatus::Active && sub.tier.is_paid() => sub.tier,
        _ => Tier::Free,
    }
}
