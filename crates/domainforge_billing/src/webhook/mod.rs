//! Billing webhooks.

mod event;
mod processor;
mod signature;

pub use event::{StripeEvent, StripeEventData};
pub use processor::{WebhookOutcome, WebhookProcessor};
pub use signature::{
    DEFAULT_TOLERANCE_SECS, SignatureHeader, sign_payload, verify_signature,
};
