//! Billing for Domainforge.
//!
//! - [`StripeClient`] implements the payment gateway against the Stripe REST API
//! - [`BillingService`] runs checkout, cancellation, upgrade and reactivation
//! - [`WebhookProcessor`] verifies webhook deliveries and applies them to
//!   stored subscriptions
//! - [`TierResolver`] decides which tier a caller's quota is counted against

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod resolver;
mod service;
mod stripe;
mod webhook;

pub use resolver::{TierResolver, entitled_tier};
pub use service::{BillingService, PriceConfig, SubscriptionDetails};
pub use stripe::{
    STRIPE_API_BASE, StripeCheckoutSession, StripeClient, StripeErrorBody, StripeErrorDetail,
    StripeList, StripeSubscription, StripeSubscriptionItem, from_unix, reference_id,
};
pub use webhook::{
    DEFAULT_TOLERANCE_SECS, SignatureHeader, StripeEvent, StripeEventData, WebhookOutcome,
    WebhookProcessor, sign_payload, verify_signature,
};
