//! Outbound HTTP failures.

/// Remote services the workspace calls over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Upstream {
    /// Supabase Auth
    #[display("Supabase Auth")]
    Supabase,
    /// Stripe REST API
    #[display("Stripe")]
    Stripe,
    /// Client shared by every upstream
    #[display("shared HTTP client")]
    SharedClient,
}

/// An HTTP exchange with an [`Upstream`] failed before a usable response
/// arrived.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error ({}): {} at line {} in {}", service, message, line, file)]
pub struct HttpError {
    /// Service the request was bound for
    pub service: Upstream,
    /// Transport failure reported by the client
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Record a transport failure talking to `service`.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_error::{HttpError, Upstream};
    ///
    /// let err = HttpError::new(Upstream::Supabase, "connection refused");
    /// assert_eq!(err.service, Upstream::Supabase);
    /// assert!(err.to_string().contains("Supabase Auth"));
    /// ```
    #[track_caller]
    pub fn new(service: Upstream, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            service,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
