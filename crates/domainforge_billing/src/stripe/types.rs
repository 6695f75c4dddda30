//! Stripe object shapes, read leniently.

use chrono::{DateTime, Utc};
use domainforge_core::{CheckoutSession, GatewaySubscription};
use serde::Deserialize;
use serde_json::Value;

/// Checkout session object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session id (`cs_…`)
    pub id: String,
    /// Hosted payment page
    #[serde(default)]
    pub url: Option<String>,
}

impl From<StripeCheckoutSession> for CheckoutSession {
    fn from(session: StripeCheckoutSession) -> Self {
        Self {
            id: session.id,
            url: session.url,
        }
    }
}

/// Subscription object as returned by `/v1/subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    /// Subscription id (`sub_…`)
    pub id: String,
    /// Customer id, or the expanded customer object
    #[serde(default)]
    pub customer: Option<Value>,
    /// Raw status
    #[serde(default)]
    pub status: String,
    /// Period end (unix seconds); newer API versions carry it per item
    #[serde(default)]
    pub current_period_end: Option<i64>,
    /// Whether cancellation is scheduled
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// Subscription items
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

/// One price line on a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    /// Item id (`si_…`)
    pub id: String,
    /// Period end (unix seconds)
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

/// Stripe list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    /// Page of objects
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    /// Error details
    pub error: StripeErrorDetail,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Error type (e.g. `invalid_request_error`)
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Convert unix seconds to a timestamp.
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Id of a possibly expanded reference (`"cus_1"` or `{"id": "cus_1", …}`).
pub fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

impl From<StripeSubscription> for GatewaySubscription {
    fn from(sub: StripeSubscription) -> Self {
        let first_item = sub.items.data.first();
        let period_end = sub
            .current_period_end
            .or_else(|| first_item.and_then(|i| i.current_period_end))
            .and_then(from_unix);

        Self {
            customer_id: sub.customer.as_ref().and_then(reference_id),
            item_id: first_item.map(|i| i.id.clone()),
            id: sub.id,
            status: sub.status,
            current_period_end: period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
        }
    }
}
