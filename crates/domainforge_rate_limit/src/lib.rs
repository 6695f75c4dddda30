//! Configuration, usage quotas and request rate limiting.
//!
//! This crate owns the service configuration (tier limits and models, route
//! rate limits, cache lifetimes) and the two in-memory counters that gate
//! traffic:
//! - [`UsageLedger`] - monthly generation quota per caller identity
//! - [`IpRateLimiter`] - fixed-window request limit per client IP
//!
//! Both keep their state behind a short synchronous lock and are meant to be
//! shared through an `Arc`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod ledger;
mod limiter;

pub use config::{
    AvailabilityConfig, DomainforgeConfig, RateLimitConfig, ServerConfig, TierConfig,
    TiersConfig, UsageConfig, UsageLimit, WindowConfig,
};
pub use ledger::{UsageLedger, window_key};
pub use limiter::{IpRateLimiter, PRUNE_THRESHOLD, RateLimitDecision};
