//! Stripe gateway.

mod client;
mod types;

pub use client::{STRIPE_API_BASE, StripeClient};
pub use types::{
    StripeCheckoutSession, StripeErrorBody, StripeErrorDetail, StripeList, StripeSubscription,
    StripeSubscriptionItem, from_unix, reference_id,
};
