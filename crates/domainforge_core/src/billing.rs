//! Payment gateway request and response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutParams {
    /// Recurring price to subscribe to
    pub price_id: String,
    /// Existing customer to reuse
    pub customer_id: Option<String>,
    /// Email to prefill when no customer exists
    pub customer_email: Option<String>,
    /// Redirect after payment
    pub success_url: String,
    /// Redirect after abandonment
    pub cancel_url: String,
    /// Tier carried in session metadata
    pub tier: String,
    /// Local user id carried in session metadata
    pub user_id: Option<String>,
}

/// Created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session id
    #[serde(rename = "sessionId")]
    pub id: String,
    /// Hosted payment page
    pub url: Option<String>,
}

/// Subject of a remote subscription as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySubscription {
    /// Remote subscription id
    pub id: String,
    /// Remote customer id
    pub customer_id: Option<String>,
    /// Raw remote status
    pub status: String,
    /// End of the current billing period
    pub current_period_end: Option<DateTime<Utc>>,
    /// Whether cancellation is scheduled
    pub cancel_at_period_end: bool,
    /// First subscription item, carrying the price
    pub item_id: Option<String>,
}
