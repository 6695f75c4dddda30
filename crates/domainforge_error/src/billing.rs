//! Billing and payment provider errors.

/// Billing failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BillingErrorKind {
    /// Stripe API call failed
    #[display("Stripe API error: {}", _0)]
    Api(String),
    /// Webhook signature header absent or webhook secret unset
    #[display("Missing signature or webhook secret")]
    MissingSignature,
    /// Webhook signature did not verify
    #[display("Invalid signature")]
    InvalidSignature,
    /// Webhook payload could not be interpreted
    #[display("Malformed event: {}", _0)]
    MalformedEvent(String),
    /// User has no subscription in the required state
    #[display("{}", _0)]
    NoSubscription(String),
    /// Stripe returned an object in an unexpected shape
    #[display("Invalid subscription structure")]
    InvalidStructure,
    /// A subscription operation failed upstream
    #[display("{}", _0)]
    OperationFailed(String),
}

/// Billing error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Billing Error: {} at line {} in {}", kind, line, file)]
pub struct BillingError {
    /// The kind of failure
    pub kind: BillingErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BillingError {
    /// Create a new BillingError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BillingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
