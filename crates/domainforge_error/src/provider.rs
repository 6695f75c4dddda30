//! LLM and upstream provider errors.

/// Upstream provider failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// API key not found in environment
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),
    /// Request never produced a response
    #[display("Request failed: {}", _0)]
    Http(String),
    /// Provider answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
    /// Provider throttled the request
    #[display("Rate limit exceeded")]
    RateLimit,
    /// Response body could not be decoded
    #[display("Failed to parse response: {}", _0)]
    ResponseParsing(String),
    /// Response decoded but carried no text
    #[display("Provider returned no completion")]
    EmptyCompletion,
}

impl ProviderErrorKind {
    /// Check if this error type is transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::Http(_) | ProviderErrorKind::RateLimit => true,
            _ => false,
        }
    }
}

/// Provider error with the provider name and location tracking.
///
/// # Examples
///
/// ```
/// use domainforge_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new("groq", ProviderErrorKind::RateLimit);
/// assert_eq!(err.provider, "groq");
/// assert!(err.kind.is_transient());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error ({}): {} at {}:{}", provider, kind, file, line)]
pub struct ProviderError {
    /// Provider that failed (e.g. "openai", "groq", "domainr")
    pub provider: String,
    /// The specific error kind
    pub kind: ProviderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error.
    #[track_caller]
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            provider: provider.into(),
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
