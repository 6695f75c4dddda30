//! `/api/subscriptions` handlers.

use crate::{
    ApiError, ApiResponse, ApiResult, AppState, OptionalUser, SanitizedJson, header_email,
    local_user, success,
};
use axum::{extract::State, http::HeaderMap};
use domainforge_billing::SubscriptionDetails;
use domainforge_core::{AuthUser, CheckoutSession, SubscriptionSummary, Tier};
use domainforge_error::{DomainforgeError, ValidationError};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Body of `POST /api/subscriptions/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    tier: Tier,
    success_url: String,
    cancel_url: String,
}

impl CheckoutRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if !self.tier.is_paid() {
            issues.push("Tier must be one of: mid, premium");
        }
        for url in [&self.success_url, &self.cancel_url] {
            if !is_http_url(url) {
                issues.push("Invalid url");
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues.join("; ")))
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Body of `POST /api/subscriptions/upgrade`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeRequest {
    tier: Tier,
}

/// Local user id of a verified caller, when one can be resolved.
async fn caller_id(state: &AppState, user: Option<&AuthUser>) -> Option<Uuid> {
    let user = user?;
    match local_user(state, user).await {
        Ok(local) => Some(local.id),
        Err(e) => {
            warn!(error = %e, "Failed to resolve local user for subscription request");
            None
        }
    }
}

async fn require_caller(state: &AppState, user: Option<&AuthUser>) -> ApiResult<Uuid> {
    caller_id(state, user)
        .await
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

fn caller_email(user: Option<&AuthUser>, headers: &HeaderMap) -> Option<String> {
    user.map(|u| u.email.clone())
        .or_else(|| header_email(headers))
}

/// Start a hosted checkout.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    headers: HeaderMap,
    SanitizedJson(request): SanitizedJson<CheckoutRequest>,
) -> ApiResult<ApiResponse<CheckoutSession>> {
    request.validate().map_err(DomainforgeError::from)?;

    let user_id = caller_id(&state, user.as_ref()).await;
    let email = caller_email(user.as_ref(), &headers);

    let session = state
        .billing
        .checkout(
            request.tier,
            user_id,
            email.as_deref(),
            &request.success_url,
            &request.cancel_url,
        )
        .await?;
    Ok(success(session))
}

/// Tier and status of the caller.
#[instrument(skip_all)]
pub async fn current(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    headers: HeaderMap,
) -> ApiResult<ApiResponse<SubscriptionSummary>> {
    let user_id = caller_id(&state, user.as_ref()).await;
    let email = caller_email(user.as_ref(), &headers);
    Ok(success(state.billing.current(user_id, email.as_deref()).await))
}

/// Gateway-side subscription, upcoming invoice and cards on file.
#[instrument(skip_all)]
pub async fn details(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> ApiResult<ApiResponse<SubscriptionDetails>> {
    let user_id = require_caller(&state, user.as_ref()).await?;
    Ok(success(state.billing.details(user_id).await?))
}

/// Cancel at the end of the current period.
#[instrument(skip_all)]
pub async fn cancel(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> ApiResult<ApiResponse<Value>> {
    let user_id = require_caller(&state, user.as_ref()).await?;
    state.billing.cancel(user_id).await?;
    Ok(success(json!({
        "message": "Subscription will be canceled at the end of the current period"
    })))
}

/// Move an active subscription to another paid tier.
#[instrument(skip_all)]
pub async fn upgrade(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    SanitizedJson(request): SanitizedJson<UpgradeRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let user_id = require_caller(&state, user.as_ref()).await?;
    state.billing.upgrade(user_id, request.tier).await?;
    Ok(success(json!({
        "message": format!("Successfully upgraded to {} tier", request.tier)
    })))
}

/// Undo a scheduled cancellation.
#[instrument(skip_all)]
pub async fn reactivate(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> ApiResult<ApiResponse<Value>> {
    let user_id = require_caller(&state, user.as_ref()).await?;
    state.billing.reactivate(user_id).await?;
    Ok(success(json!({ "message": "Subscription reactivated successfully" })))
}
