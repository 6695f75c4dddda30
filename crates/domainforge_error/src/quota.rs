//! Usage quota and rate limit error types.

/// Reasons a request was refused for volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QuotaErrorKind {
    /// Monthly generation limit for the caller's tier is used up
    #[display(
        "Monthly usage limit reached for your tier. Please upgrade or wait until next month."
    )]
    MonthlyLimitReached {
        /// Tier name the limit belongs to
        tier: String,
        /// The exhausted limit
        limit: u32,
    },
    /// Per-IP request window is full
    #[display("Too many requests. Please try again later.")]
    RateLimited {
        /// Seconds until the window resets
        retry_after_secs: u64,
    },
}

/// Quota error with source location.
///
/// # Examples
///
/// ```
/// use domainforge_error::{QuotaError, QuotaErrorKind};
///
/// let err = QuotaError::new(QuotaErrorKind::RateLimited { retry_after_secs: 30 });
/// assert!(err.to_string().contains("Too many requests"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Error: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    /// The kind of refusal
    pub kind: QuotaErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl QuotaError {
    /// Create a new QuotaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
