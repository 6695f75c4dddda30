//! Trait definitions for the Domainforge domain suggestion service.
//!
//! This crate defines the seams between the HTTP layer and the external
//! services it orchestrates: LLM providers, the availability API, the
//! identity provider, the payment gateway and the persistence layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{
    AvailabilityLookup, CompletionProvider, HistoryRepository, IdentityProvider, PaymentGateway,
    StoreHealth, SubscriptionRepository, UserRepository,
};
pub use types::ServiceStatus;
