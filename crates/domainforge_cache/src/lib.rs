//! Availability result caching with TTL support.
//!
//! This crate caches domain availability answers so repeated checks for the
//! same name skip the registry API until the entry goes stale.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;

pub use cache::{AvailabilityCache, AvailabilityCacheConfig, AvailabilityCacheConfigBuilder};
