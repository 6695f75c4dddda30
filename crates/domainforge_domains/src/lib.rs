//! Domain availability checking.
//!
//! [`AvailabilityChecker`] answers "can this name be registered?" from an
//! [`AvailabilityCache`](domainforge_cache::AvailabilityCache) when it can and
//! from the Domainr status API otherwise.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checker;
mod domainr;
mod validation;

pub use checker::{AvailabilityChecker, validate_batch};
pub use domainr::{DOMAINR_ENDPOINT, DomainStatus, DomainrClient, StatusResponse};
pub use validation::{MAX_BATCH_SIZE, validate_domain_name};
