//! Core data types for the Domainforge domain suggestion service.
//!
//! This crate provides the records, enums and option types shared by every
//! other crate in the workspace.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod availability;
mod billing;
mod generation;
mod history;
mod identity;
mod model;
mod subscription;
mod tier;

pub use availability::{AvailabilityRecord, LookupOutcome};
pub use billing::{CheckoutParams, CheckoutSession, GatewaySubscription};
pub use generation::{GenerationOptions, GenerationOptionsBuilder, GenerationResult};
pub use history::{DomainSuggestion, GenerationSession, SessionWithSuggestions, User};
pub use identity::{AuthUser, CallerIdentity};
pub use model::{AiModel, ProviderKind};
pub use subscription::{
    Subscription, SubscriptionStatus, SubscriptionSummary, SubscriptionUpdate, SubscriptionUpsert,
};
pub use tier::Tier;
