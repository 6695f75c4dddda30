//! Request extractors: JSON bodies, bearer identities and client addresses.

use crate::{ApiError, AppState};
use axum::{
    Json, async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{HeaderMap, Extensions, header, request::Parts},
};
use domainforge_core::{AuthUser, User};
use domainforge_error::DomainforgeResult;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::LazyLock;
use tracing::debug;

/// Header carrying the caller's email for unauthenticated requests.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

static SCRIPT_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("Valid script tag regex")
});
static QUOTE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['";\\]"#).expect("Valid quote regex"));
static HTML_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Valid tag regex"));

/// Strip script blocks, quote and statement characters, and HTML tags, then trim.
///
/// # Examples
///
/// ```
/// use domainforge_server::sanitize_str;
///
/// assert_eq!(sanitize_str("  <b>Bold</b> idea; "), "Bold idea");
/// assert_eq!(sanitize_str("x<script>alert(1)</script>y"), "xy");
/// ```
pub fn sanitize_str(input: &str) -> String {
    let without_scripts = SCRIPT_TAGS.replace_all(input, "");
    let without_quotes = QUOTE_CHARS.replace_all(&without_scripts, "");
    let without_tags = HTML_TAGS.replace_all(&without_quotes, "");
    without_tags.trim().to_string()
}

/// Apply [`sanitize_str`] to every string in a JSON document.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

async fn json_value<S>(req: Request, state: &S) -> Result<Value, ApiError>
where
    S: Send + Sync,
{
    let Json(value) = Json::<Value>::from_request(req, state)
        .await
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// JSON body decoded as-is, with envelope-shaped rejections.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = json_value(req, state).await?;
        Ok(Self(decode(value)?))
    }
}

/// JSON body with every string sanitized before decoding.
#[derive(Debug, Clone)]
pub struct SanitizedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for SanitizedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = json_value(req, state).await?;
        Ok(Self(decode(sanitize_value(value))?))
    }
}

/// Token from an `Authorization: Bearer …` header, if well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Non-blank `x-user-email` header.
pub fn header_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_EMAIL_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// Peer address recorded by the listener, or `"unknown"`.
pub fn client_ip(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Raw bearer token; rejects with 401 when the header is missing.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|t| Self(t.to_string()))
            .ok_or_else(|| {
                ApiError::unauthorized("Authorization header with Bearer token is required")
            })
    }
}

/// Caller verified through the identity provider.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let Some(identity) = &state.identity else {
            return Err(ApiError::new(
                axum::http::StatusCode::NOT_IMPLEMENTED,
                "Auth provider not configured",
            ));
        };
        match identity.verify_token(&token).await {
            Ok(user) => Ok(Self(user)),
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                Err(ApiError::unauthorized("Invalid or expired token"))
            }
        }
    }
}

/// Caller verified through the identity provider when a valid token is present.
///
/// Missing or invalid tokens yield `None` rather than a rejection.
#[derive(Debug, Clone, Default)]
pub struct OptionalUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (Some(token), Some(identity)) = (bearer_token(&parts.headers), &state.identity) else {
            return Ok(Self(None));
        };
        match identity.verify_token(token).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(e) => {
                debug!(error = %e, "Ignoring unverifiable token");
                Ok(Self(None))
            }
        }
    }
}

/// Local user record for a verified caller, created on first sight.
///
/// New users are named from their identity metadata, falling back to the
/// local part of the email.
///
/// # Errors
///
/// Returns the repository error when the lookup or insert fails.
pub async fn local_user(state: &AppState, user: &AuthUser) -> DomainforgeResult<User> {
    let name = user
        .name
        .clone()
        .unwrap_or_else(|| default_name(&user.email));
    state.users.get_or_create(&user.email, Some(&name)).await
}

/// Display name derived from an email address.
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
