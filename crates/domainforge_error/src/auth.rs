//! Authentication error types.

/// Authentication failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// No bearer token on a request that requires one
    #[display("Authorization header with Bearer token is required")]
    MissingToken,
    /// Identity provider rejected the token
    #[display("Invalid or expired token")]
    InvalidToken,
    /// Identity provider rejected the credentials
    #[display("{}", _0)]
    Rejected(String),
    /// Operation requires a signed-in user
    #[display("Authentication required")]
    Required,
}

/// Authentication error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of failure
    pub kind: AuthErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl AuthError {
    /// Create a new AuthError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
