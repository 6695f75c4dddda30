//! Request validation error types.

/// Validation error carrying every issue found in a request.
///
/// # Examples
///
/// ```
/// use domainforge_error::ValidationError;
///
/// let err = ValidationError::from_issues(vec![
///     "prompt must not be empty".to_string(),
///     "tier is invalid".to_string(),
/// ]);
/// assert_eq!(err.message, "prompt must not be empty; tier is invalid");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", message, line, file)]
pub struct ValidationError {
    /// Human-readable description, issues joined with `; `
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a ValidationError from a list of issues.
    #[track_caller]
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self::new(issues.join("; "))
    }
}
