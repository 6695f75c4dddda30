//! Webhook event envelope.

use serde::Deserialize;
use serde_json::Value;

/// Event delivered to the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// Event id (`evt_…`)
    #[serde(default)]
    pub id: String,
    /// Event type, e.g. `invoice.payment_failed`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload
    pub data: StripeEventData,
}

/// Event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    /// Object the event is about
    pub object: Value,
}

impl StripeEvent {
    /// String field on the event object.
    pub fn object_str(&self, field: &str) -> Option<&str> {
        self.data.object.get(field).and_then(Value::as_str)
    }

    /// String value under the object's `metadata`.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.data
            .object
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }
}
