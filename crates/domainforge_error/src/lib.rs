//! Error types for the Domainforge service.
//!
//! This crate provides the foundation error types used throughout the workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The HTTP layer maps [`DomainforgeErrorKind`] variants onto status codes:
//! validation 400, auth 401, quota 429, not configured 501, everything else 500.
//!
//! # Examples
//!
//! ```
//! use domainforge_error::{DomainforgeResult, HttpError, Upstream};
//!
//! fn fetch_data() -> DomainforgeResult<String> {
//!     Err(HttpError::new(Upstream::Stripe, "Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod billing;
mod config;
mod database;
mod error;
mod http;
mod json;
mod not_configured;
mod provider;
mod quota;
mod validation;

pub use auth::{AuthError, AuthErrorKind};
pub use billing::{BillingError, BillingErrorKind};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{DomainforgeError, DomainforgeErrorKind, DomainforgeResult};
pub use http::{HttpError, Upstream};
pub use json::JsonError;
pub use not_configured::NotConfiguredError;
pub use provider::{ProviderError, ProviderErrorKind};
pub use quota::{QuotaError, QuotaErrorKind};
pub use validation::ValidationError;
