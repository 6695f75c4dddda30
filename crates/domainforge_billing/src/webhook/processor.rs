//! Applies billing events to stored subscriptions.

use super::{DEFAULT_TOLERANCE_SECS, StripeEvent, verify_signature};
use crate::stripe::{StripeSubscription, reference_id};
use chrono::Utc;
use domainforge_core::{
    GatewaySubscription, SubscriptionStatus, SubscriptionUpdate, SubscriptionUpsert, Tier,
};
use domainforge_error::{BillingError, BillingErrorKind, DomainforgeResult, NotConfiguredError};
use domainforge_interface::{PaymentGateway, SubscriptionRepository};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// What an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A local subscription was written
    Applied(Uuid),
    /// The event referenced a subscription with no local record
    UnknownSubscription(String),
    /// The event lacked what was needed to act on it
    Skipped(String),
    /// Event type not handled
    Ignored(String),
}

/// Verifies and applies webhook events.
#[derive(Clone)]
pub struct WebhookProcessor {
    gateway: Option<Arc<dyn PaymentGateway>>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    secret: Option<String>,
    tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookProcessor")
            .field("gateway", &self.gateway.is_some())
            .field("secret", &self.secret.is_some())
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookProcessor {
    /// Create a processor.
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        secret: Option<String>,
    ) -> Self {
        Self {
            gateway,
            subscriptions,
            secret: secret.filter(|s| !s.is_empty()),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Replace the timestamp tolerance.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify a raw delivery and decode the event.
    ///
    /// # Errors
    ///
    /// - Missing-signature error when the header is absent or no secret is set
    /// - Invalid-signature error when verification fails
    /// - Malformed-event error when the verified body is not an event
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> DomainforgeResult<StripeEvent> {
        let (Some(header), Some(secret)) = (header, self.secret.as_deref()) else {
            return Err(BillingError::new(BillingErrorKind::MissingSignature).into());
        };
        verify_signature(
            payload,
            header,
            secret,
            Utc::now().timestamp(),
            self.tolerance_secs,
        )?;

        serde_json::from_slice(payload).map_err(|e| {
            BillingError::new(BillingErrorKind::MalformedEvent(e.to_string())).into()
        })
    }

    /// Apply one event.
    ///
    /// Missing local records are logged and reported, not treated as failures.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway is unconfigured or a gateway or store
    /// call fails.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn handle(&self, event: &StripeEvent) -> DomainforgeResult<WebhookOutcome> {
        if self.gateway.is_none() {
            Err(NotConfiguredError::new("Stripe not configured"))?
        }

        let outcome = match event.event_type.as_str() {
            "checkout.session.completed" => self.checkout_completed(event).await?,
            "customer.subscription.created" | "customer.subscription.updated" => {
                self.subscription_changed(event).await?
            }
            "customer.subscription.deleted" => {
                let Some(stripe_id) = event.object_str("id") else {
                    return Ok(skipped("subscription object without id"));
                };
                self.apply(stripe_id, SubscriptionUpdate::status(SubscriptionStatus::Canceled))
                    .await?
            }
            "invoice.payment_succeeded" => {
                self.invoice_status(event, SubscriptionStatus::Active).await?
            }
            "invoice.payment_failed" => {
                self.invoice_status(event, SubscriptionStatus::PastDue).await?
            }
            other => {
                info!(event_type = other, "Unhandled event type");
                WebhookOutcome::Ignored(other.to_string())
            }
        };
        Ok(outcome)
    }

    async fn checkout_completed(&self, event: &StripeEvent) -> DomainforgeResult<WebhookOutcome> {
        let Some(user_id) = event.metadata("userId") else {
            error!("No userId in checkout session metadata");
            return Ok(skipped("missing userId"));
        };
        let Ok(user_id) = Uuid::parse_str(user_id) else {
            error!(user_id, "Unparseable userId in checkout session metadata");
            return Ok(skipped("invalid userId"));
        };
        let tier = match event.metadata("tier").map(Tier::from_str) {
            Some(Ok(tier)) if tier.is_paid() => tier,
            _ => {
                error!("Invalid tier in checkout session metadata");
                return Ok(skipped("invalid tier"));
            }
        };
        let Some(stripe_id) = event.object_str("subscription") else {
            error!("Checkout session has no subscription");
            return Ok(skipped("missing subscription"));
        };

        let remote = self.gateway()?.retrieve_subscription(stripe_id).await?;
        let customer = event
            .data
            .object
            .get("customer")
            .and_then(reference_id)
            .or(remote.customer_id.clone());

        let stored = self
            .subscriptions
            .upsert_for_user(SubscriptionUpsert {
                user_id,
                stripe_customer_id: customer,
                stripe_subscription_id: Some(remote.id.clone()),
                tier,
                status: SubscriptionStatus::from_stripe(&remote.status),
                current_period_end: remote.current_period_end,
            })
            .await?;

        info!(%user_id, %tier, "Subscription created/updated from checkout");
        Ok(WebhookOutcome::Applied(stored.id))
    }

    async fn subscription_changed(&self, event: &StripeEvent) -> DomainforgeResult<WebhookOutcome> {
        let Some(stripe_id) = event.object_str("id") else {
            return Ok(skipped("subscription object without id"));
        };
        let remote: StripeSubscription = serde_json::from_value(event.data.object.clone())
            .map_err(|e| BillingError::new(BillingErrorKind::MalformedEvent(e.to_string())))?;
        let remote = GatewaySubscription::from(remote);

        let update = SubscriptionUpdate {
            status: Some(SubscriptionStatus::from_stripe(&remote.status)),
            tier: None,
            current_period_end: remote.current_period_end,
        };
        self.apply(stripe_id, update).await
    }

    async fn invoice_status(
        &self,
        event: &StripeEvent,
        status: SubscriptionStatus,
    ) -> DomainforgeResult<WebhookOutcome> {
        let Some(stripe_id) = event.data.object.get("subscription").and_then(reference_id) else {
            return Ok(skipped("invoice without subscription"));
        };
        self.apply(&stripe_id, SubscriptionUpdate::status(status)).await
    }

    async fn apply(
        &self,
        stripe_id: &str,
        update: SubscriptionUpdate,
    ) -> DomainforgeResult<WebhookOutcome> {
        let Some(local) = self.subscriptions.find_by_stripe_id(stripe_id).await? else {
            warn!(stripe_id, "No local subscription for Stripe subscription");
            return Ok(WebhookOutcome::UnknownSubscription(stripe_id.to_string()));
        };
        let updated = self.subscriptions.update(local.id, update).await?;
        info!(stripe_id, status = %updated.status, "Subscription updated");
        Ok(WebhookOutcome::Applied(updated.id))
    }

    fn gateway(&self) -> DomainforgeResult<&Arc<dyn PaymentGateway>> {
        match &self.gateway {
            Some(gateway) => Ok(gateway),
            None => Err(NotConfiguredError::new("Stripe not configured"))?,
        }
    }
}

fn skipped(reason: &str) -> WebhookOutcome {
    WebhookOutcome::Skipped(reason.to_string())
}
