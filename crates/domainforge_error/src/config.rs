//! Configuration loading failures.

/// Loading or deserializing the layered configuration failed.
///
/// `layer` names the source being read (a file path, or `layered sources`
/// once every layer is merged); `key` is the dotted setting the loader
/// blamed, when it named one.
#[derive(Debug, Clone, derive_more::Error)]
pub struct ConfigError {
    /// Source being read when the failure happened
    pub layer: String,
    /// Offending setting, e.g. `tiers.free.limit`
    pub key: Option<String>,
    /// Loader message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration Error in {}", self.layer)?;
        if let Some(key) = &self.key {
            write!(f, " at `{}`", key)?;
        }
        write!(f, ": {} at line {} in {}", self.message, self.line, self.file)
    }
}

impl ConfigError {
    /// Record a failure reading `layer`.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_error::ConfigError;
    ///
    /// let err = ConfigError::new("./domainforge.toml", "invalid type: string")
    ///     .with_key("rate_limit.domains.max_requests");
    /// assert_eq!(err.key.as_deref(), Some("rate_limit.domains.max_requests"));
    /// assert!(err.to_string().contains("at `rate_limit.domains.max_requests`"));
    /// ```
    #[track_caller]
    pub fn new(layer: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            layer: layer.into(),
            key: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the setting the loader blamed.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}
