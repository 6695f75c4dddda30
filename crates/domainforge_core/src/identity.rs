//! Caller identities.

use serde::{Deserialize, Serialize};

/// Key under which a caller's usage is counted.
///
/// # Examples
///
/// ```
/// use domainforge_core::CallerIdentity;
///
/// let id = CallerIdentity::resolve(None, Some("Ann@Example.com"), "10.0.0.1");
/// assert_eq!(id.to_string(), "email:ann@example.com");
///
/// let id = CallerIdentity::resolve(Some("42"), Some("ann@example.com"), "10.0.0.1");
/// assert_eq!(id.to_string(), "user:42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CallerIdentity {
    /// Authenticated or declared user id
    #[display("user:{}", _0)]
    User(String),
    /// Email supplied by the client
    #[display("email:{}", _0)]
    Email(String),
    /// Peer address
    #[display("ip:{}", _0)]
    Ip(String),
}

impl CallerIdentity {
    /// Pick the strongest identity available: user id, then email, then IP.
    ///
    /// Emails are lower-cased. Blank values are skipped.
    pub fn resolve(user_id: Option<&str>, email: Option<&str>, ip: &str) -> Self {
        if let Some(id) = user_id.map(str::trim).filter(|s| !s.is_empty()) {
            return CallerIdentity::User(id.to_string());
        }
        if let Some(email) = email.map(str::trim).filter(|s| !s.is_empty()) {
            return CallerIdentity::Email(email.to_lowercase());
        }
        CallerIdentity::Ip(ip.to_string())
    }
}

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity provider user id
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name from user metadata
    #[serde(default)]
    pub name: Option<String>,
}
