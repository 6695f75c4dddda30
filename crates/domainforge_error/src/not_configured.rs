//! Missing-configuration error types.

/// A feature was requested whose credentials or settings are absent.
///
/// Distinct from a failed call: nothing was attempted.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Configured: {} at line {} in {}", message, line, file)]
pub struct NotConfiguredError {
    /// Description of what is missing
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotConfiguredError {
    /// Create a new NotConfiguredError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_error::NotConfiguredError;
    ///
    /// let err = NotConfiguredError::new("No AI provider configured");
    /// assert!(err.message.contains("AI provider"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
