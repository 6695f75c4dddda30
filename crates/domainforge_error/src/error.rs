//! Top-level error wrapper types.

use crate::{
    AuthError, BillingError, ConfigError, DatabaseError, HttpError, JsonError,
    NotConfiguredError, ProviderError, QuotaError, ValidationError,
};

/// Every failure the workspace can surface.
///
/// # Examples
///
/// ```
/// use domainforge_error::{DomainforgeError, HttpError, Upstream};
///
/// let http_err = HttpError::new(Upstream::Supabase, "Connection failed");
/// let err: DomainforgeError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DomainforgeErrorKind {
    /// Transport failure talking to an upstream
    #[from(HttpError)]
    Http(HttpError),
    /// Upstream body did not decode
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Request failed validation
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Caller could not be authenticated
    #[from(AuthError)]
    Auth(AuthError),
    /// Usage quota or rate limit exhausted
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Feature credentials absent
    #[from(NotConfiguredError)]
    NotConfigured(NotConfiguredError),
    /// Upstream provider failed
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Persistence failed
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Billing failed
    #[from(BillingError)]
    Billing(BillingError),
}

/// Domainforge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use domainforge_error::{DomainforgeResult, ConfigError};
///
/// fn might_fail() -> DomainforgeResult<()> {
///     Err(ConfigError::new("bundled defaults", "Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Domainforge Error: {}", _0)]
pub struct DomainforgeError(Box<DomainforgeErrorKind>);

impl DomainforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: DomainforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DomainforgeErrorKind {
        &self.0
    }

    /// Message safe to return to API callers (no source locations).
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_error::{DomainforgeError, ValidationError};
    ///
    /// let err = DomainforgeError::from(ValidationError::new("Prompt is required"));
    /// assert_eq!(err.public_message(), "Prompt is required");
    /// ```
    pub fn public_message(&self) -> String {
        match self.kind() {
            DomainforgeErrorKind::Validation(e) => e.message.clone(),
            DomainforgeErrorKind::Auth(e) => e.kind.to_string(),
            DomainforgeErrorKind::Quota(e) => e.kind.to_string(),
            DomainforgeErrorKind::NotConfigured(e) => e.message.clone(),
            DomainforgeErrorKind::Billing(e) => e.kind.to_string(),
            DomainforgeErrorKind::Provider(_) => "Failed to generate domains".to_string(),
            DomainforgeErrorKind::Database(_) => "Database operation failed".to_string(),
            DomainforgeErrorKind::Http(_)
            | DomainforgeErrorKind::Json(_)
            | DomainforgeErrorKind::Config(_) => "Something went wrong".to_string(),
        }
    }
}

// Generic From implementation for any type that converts to DomainforgeErrorKind
impl<T> From<T> for DomainforgeError
where
    T: Into<DomainforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Domainforge operations.
pub type DomainforgeResult<T> = std::result::Result<T, DomainforgeError>;
