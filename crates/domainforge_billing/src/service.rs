//! Subscription operations exposed to users.

use domainforge_core::{
    CheckoutParams, CheckoutSession, Subscription, SubscriptionStatus, SubscriptionSummary,
    SubscriptionUpdate, Tier,
};
use domainforge_error::{
    BillingError, BillingErrorKind, DomainforgeResult, NotConfiguredError, ValidationError,
};
use domainforge_interface::{PaymentGateway, SubscriptionRepository};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Stripe price ids per paid tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceConfig {
    /// Price for the mid tier
    pub mid: Option<String>,
    /// Price for the premium tier
    pub premium: Option<String>,
}

impl PriceConfig {
    /// Read `STRIPE_PRICE_MID` and `STRIPE_PRICE_PREMIUM`.
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            mid: read("STRIPE_PRICE_MID"),
            premium: read("STRIPE_PRICE_PREMIUM"),
        }
    }

    /// Price id for a paid tier.
    pub fn price_for(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Free => None,
            Tier::Mid => self.mid.as_deref(),
            Tier::Premium => self.premium.as_deref(),
        }
    }

    /// Whether every paid tier has a price.
    pub fn is_complete(&self) -> bool {
        self.mid.is_some() && self.premium.is_some()
    }
}

/// Gateway-side view of a user's subscription. Each part is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    /// Remote subscription object
    pub subscription: Option<Value>,
    /// Next invoice
    pub upcoming_invoice: Option<Value>,
    /// Cards on file
    pub payment_methods: Vec<Value>,
}

/// Checkout, cancellation, upgrade and reactivation.
#[derive(Clone)]
pub struct BillingService {
    gateway: Option<Arc<dyn PaymentGateway>>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    prices: PriceConfig,
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("gateway", &self.gateway.is_some())
            .field("prices", &self.prices)
            .finish()
    }
}

fn require_paid(tier: Tier) -> DomainforgeResult<()> {
    if !tier.is_paid() {
        Err(ValidationError::new("Tier must be one of: mid, premium"))?
    }
    Ok(())
}

fn no_subscription(message: &str) -> BillingError {
    BillingError::new(BillingErrorKind::NoSubscription(message.to_string()))
}

fn stripe_id(sub: &Subscription) -> Option<&str> {
    sub.stripe_subscription_id.as_deref()
}

impl BillingService {
    /// Create a service.
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        prices: PriceConfig,
    ) -> Self {
        Self {
            gateway,
            subscriptions,
            prices,
        }
    }

    /// Whether a gateway and every price id are present.
    pub fn is_configured(&self) -> bool {
        self.gateway.is_some() && self.prices.is_complete()
    }

    fn gateway(&self) -> DomainforgeResult<&Arc<dyn PaymentGateway>> {
        match &self.gateway {
            Some(gateway) => Ok(gateway),
            None => Err(NotConfiguredError::new("Stripe not configured"))?,
        }
    }

    fn price(&self, tier: Tier) -> DomainforgeResult<&str> {
        match self.prices.price_for(tier) {
            Some(price) => Ok(price),
            None => Err(NotConfiguredError::new("Price ID not set"))?,
        }
    }

    /// Start a hosted checkout for a paid tier.
    ///
    /// Reuses the Stripe customer from the user's latest subscription when
    /// there is one, otherwise prefills `email`.
    ///
    /// # Errors
    ///
    /// - Validation error for the free tier
    /// - Not-configured error when Stripe or the tier's price is missing
    /// - Billing error when Stripe rejects the session
    #[instrument(skip(self, tier, email, success_url, cancel_url), fields(%tier))]
    pub async fn checkout(
        &self,
        tier: Tier,
        user_id: Option<Uuid>,
        email: Option<&str>,
        success_url: &str,
        cancel_url: &str,
    ) -> DomainforgeResult<CheckoutSession> {
        require_paid(tier)?;
        let gateway = self.gateway()?;
        let price_id = self.price(tier)?;

        let customer_id = match user_id {
            Some(id) => match self.subscriptions.latest_for_user(id).await {
                Ok(sub) => sub.and_then(|s| s.stripe_customer_id),
                Err(e) => {
                    warn!(error = %e, "Could not look up existing customer");
                    None
                }
            },
            None => None,
        };

        let params = CheckoutParams {
            price_id: price_id.to_string(),
            customer_email: if customer_id.is_none() {
                email.map(str::to_string)
            } else {
                None
            },
            customer_id,
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
            tier: tier.to_string(),
            user_id: user_id.map(|id| id.to_string()),
        };
        gateway.create_checkout_session(&params).await
    }

    /// Tier and status for a user id, falling back to email.
    pub async fn current(&self, user_id: Option<Uuid>, email: Option<&str>) -> SubscriptionSummary {
        match (user_id, email) {
            (Some(id), _) => self.subscriptions.status_for(id).await,
            (None, Some(email)) => match self.subscriptions.latest_for_email(email).await {
                Ok(Some(sub)) => SubscriptionSummary::from(&sub),
                Ok(None) => SubscriptionSummary::default(),
                Err(e) => {
                    warn!(error = %e, "Subscription lookup by email failed");
                    SubscriptionSummary::default()
                }
            },
            (None, None) => SubscriptionSummary::default(),
        }
    }

    /// Schedule cancellation at period end and mark the record canceled.
    ///
    /// # Errors
    ///
    /// Billing error when there is no current subscription or Stripe fails.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: Uuid) -> DomainforgeResult<()> {
        let gateway = self.gateway()?;
        let sub = self.subscriptions.active_for_user(user_id).await?;
        let Some((sub, remote_id)) = sub.as_ref().and_then(|s| stripe_id(s).map(|id| (s, id)))
        else {
            return Err(no_subscription("No active subscription found").into());
        };

        gateway
            .set_cancel_at_period_end(remote_id, true)
            .await
            .map_err(|e| failed("cancel", e))?;
        self.subscriptions
            .update(sub.id, SubscriptionUpdate::status(SubscriptionStatus::Canceled))
            .await?;
        info!(%user_id, "Subscription set to cancel at period end");
        Ok(())
    }

    /// Move a current subscription onto another paid tier's price.
    ///
    /// # Errors
    ///
    /// - Validation error for the free tier
    /// - Not-configured error when Stripe or the tier's price is missing
    /// - Billing error when there is no current subscription, the remote
    ///   subscription has no items, or Stripe fails
    #[instrument(skip(self, tier), fields(%tier))]
    pub async fn upgrade(&self, user_id: Uuid, tier: Tier) -> DomainforgeResult<()> {
        require_paid(tier)?;
        let gateway = self.gateway()?;
        let price_id = self.price(tier)?;

        let sub = self.subscriptions.active_for_user(user_id).await?;
        let Some((sub, remote_id)) = sub.as_ref().and_then(|s| stripe_id(s).map(|id| (s, id)))
        else {
            return Err(no_subscription("No active subscription found").into());
        };

        let remote = gateway
            .retrieve_subscription(remote_id)
            .await
            .map_err(|e| failed("upgrade", e))?;
        let Some(item_id) = remote.item_id else {
            return Err(BillingError::new(BillingErrorKind::InvalidStructure).into());
        };

        gateway
            .change_price(remote_id, &item_id, price_id)
            .await
            .map_err(|e| failed("upgrade", e))?;
        self.subscriptions
            .update(sub.id, SubscriptionUpdate::tier(tier))
            .await?;
        info!(%user_id, "Subscription upgraded");
        Ok(())
    }

    /// Undo a scheduled cancellation.
    ///
    /// # Errors
    ///
    /// Billing error when there is no canceled subscription or Stripe fails.
    #[instrument(skip(self))]
    pub async fn reactivate(&self, user_id: Uuid) -> DomainforgeResult<()> {
        let gateway = self.gateway()?;
        let sub = self.subscriptions.canceled_for_user(user_id).await?;
        let Some((sub, remote_id)) = sub.as_ref().and_then(|s| stripe_id(s).map(|id| (s, id)))
        else {
            return Err(no_subscription("No canceled subscription found").into());
        };

        gateway
            .set_cancel_at_period_end(remote_id, false)
            .await
            .map_err(|e| failed("reactivate", e))?;
        self.subscriptions
            .update(sub.id, SubscriptionUpdate::status(SubscriptionStatus::Active))
            .await?;
        info!(%user_id, "Subscription reactivated");
        Ok(())
    }

    /// Remote subscription, upcoming invoice and payment methods.
    ///
    /// # Errors
    ///
    /// Billing error when the latest subscription lacks Stripe ids.
    #[instrument(skip(self))]
    pub async fn details(&self, user_id: Uuid) -> DomainforgeResult<SubscriptionDetails> {
        let gateway = self.gateway()?;
        let sub = self.subscriptions.latest_for_user(user_id).await?;
        let Some((subscription_id, customer_id)) = sub.as_ref().and_then(|s| {
            Some((
                s.stripe_subscription_id.as_deref()?,
                s.stripe_customer_id.as_deref()?,
            ))
        }) else {
            return Err(no_subscription("No subscription found").into());
        };

        let (subscription, invoice, methods) = futures::join!(
            gateway.subscription_object(subscription_id),
            gateway.upcoming_invoice(customer_id),
            gateway.payment_methods(customer_id),
        );

        Ok(SubscriptionDetails {
            subscription: best_effort("subscription", subscription),
            upcoming_invoice: best_effort("upcoming invoice", invoice),
            payment_methods: best_effort("payment methods", methods).unwrap_or_default(),
        })
    }
}

fn best_effort<T>(what: &str, result: DomainforgeResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, what, "Detail lookup failed");
            None
        }
    }
}

fn failed(operation: &str, cause: domainforge_error::DomainforgeError) -> BillingError {
    error!(error = %cause, operation, "Stripe operation failed");
    BillingError::new(BillingErrorKind::OperationFailed(format!(
        "Failed to {} subscription",
        operation
    )))
}
