//! `/auth` handlers proxying to the identity provider.

use crate::{
    ApiError, ApiJson, ApiResponse, ApiResult, AppState, AuthenticatedUser, BearerToken,
    default_name, local_user, success,
};
use axum::{
    extract::State,
    http::StatusCode,
};
use domainforge_core::User;
use domainforge_error::{DomainforgeError, DomainforgeErrorKind};
use domainforge_interface::IdentityProvider;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl Credentials {
    fn required(&self) -> Result<(&str, &str), ApiError> {
        let email = self.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let password = self.password.as_deref().filter(|s| !s.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::bad_request("Email and password are required")),
        }
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Local user joined with the identity provider id.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    user: User,
    auth_id: String,
}

fn identity(state: &AppState) -> Result<&Arc<dyn IdentityProvider>, ApiError> {
    state
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::new(StatusCode::NOT_IMPLEMENTED, "Auth provider not configured"))
}

/// Provider rejections keep their message under the given status; anything
/// else maps by kind.
fn rejected(err: DomainforgeError, status: StatusCode) -> ApiError {
    match err.kind() {
        DomainforgeErrorKind::Auth(_) => {
            warn!(error = %err, "Identity provider rejected request");
            ApiError::new(status, err.public_message())
        }
        _ => ApiError::from(err),
    }
}

fn field(payload: &Value, key: &str) -> Value {
    payload.get(key).cloned().unwrap_or(Value::Null)
}

async fn ensure_local_user(state: &AppState, email: &str, name: Option<&str>) {
    if let Err(e) = state.users.get_or_create(email, name).await {
        warn!(error = %e, "Failed to create local user; it will be created on next request");
    }
}

/// Create an account.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<ApiResponse<Value>> {
    let (email, password) = body.required()?;
    let name = body
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| default_name(email));

    let payload = identity(&state)?
        .register(email, password, Some(&name))
        .await
        .map_err(|e| rejected(e, StatusCode::BAD_REQUEST))?;

    if payload.get("user").is_none_or(Value::is_null) {
        return Err(ApiError::internal("Failed to create user account"));
    }

    ensure_local_user(&state, email, Some(&name)).await;
    info!("User registered");

    Ok(success(json!({
        "user": field(&payload, "user"),
        "session": field(&payload, "session"),
        "message": "User registered successfully",
    })))
}

/// Password sign-in.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<ApiResponse<Value>> {
    let (email, password) = body.required()?;

    let payload = identity(&state)?
        .login(email, password)
        .await
        .map_err(|e| rejected(e, StatusCode::UNAUTHORIZED))?;

    let (user, session) = (field(&payload, "user"), field(&payload, "session"));
    if user.is_null() || session.is_null() {
        return Err(ApiError::internal("Failed to authenticate user"));
    }

    let name = user
        .pointer("/user_metadata/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default_name(email));
    ensure_local_user(&state, email, Some(&name)).await;
    info!("User logged in");

    Ok(success(json!({
        "user": user,
        "session": session,
        "message": "User logged in successfully",
    })))
}

/// Exchange a refresh token for a new session.
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let Some(token) = body.refresh_token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(ApiError::bad_request("Refresh token is required"));
    };

    let payload = identity(&state)?
        .refresh(token)
        .await
        .map_err(|e| rejected(e, StatusCode::UNAUTHORIZED))?;

    let session = field(&payload, "session");
    if session.is_null() {
        return Err(ApiError::unauthorized("Failed to refresh session"));
    }

    Ok(success(json!({
        "session": session,
        "message": "Token refreshed successfully",
    })))
}

/// Local record of the authenticated caller.
#[instrument(skip_all, fields(user = %auth.email))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthenticatedUser(auth): AuthenticatedUser,
) -> ApiResult<ApiResponse<CurrentUser>> {
    let user = local_user(&state, &auth).await.map_err(|e| {
        warn!(error = %e, "Failed to load or create local user");
        ApiError::internal("Failed to initialize user account")
    })?;

    Ok(success(CurrentUser {
        user,
        auth_id: auth.id,
    }))
}

/// Revoke the caller's session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiResponse<Value>> {
    identity(&state)?.logout(&token).await.map_err(|e| {
        warn!(error = %e, "Logout failed");
        ApiError::internal(e.public_message())
    })?;

    Ok(success(json!({ "message": "User logged out successfully" })))
}
