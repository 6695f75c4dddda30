//! Undecodable upstream payloads.

use crate::Upstream;

/// A successful upstream response whose body did not match the expected shape.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "JSON Error: malformed {} payload from {}: {} at line {} in {}",
    payload,
    service,
    message,
    line,
    file
)]
pub struct JsonError {
    /// Service that sent the body
    pub service: Upstream,
    /// What the body was decoded as, e.g. `user` or `Subscription`
    pub payload: &'static str,
    /// Decoder message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Record a body from `service` that failed to decode as `payload`.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_error::{JsonError, Upstream};
    ///
    /// let err = JsonError::new(Upstream::Supabase, "user", "missing field `id`");
    /// assert_eq!(err.payload, "user");
    /// assert!(err.to_string().contains("malformed user payload from Supabase Auth"));
    /// ```
    #[track_caller]
    pub fn new(service: Upstream, payload: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            service,
            payload,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
