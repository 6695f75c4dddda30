//! Stripe webhook endpoint.

use crate::{ApiError, AppState};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use domainforge_billing::WebhookOutcome;
use serde_json::json;
use tracing::{error, info, instrument, warn};

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verify and apply one delivery.
///
/// Signature problems answer 400 with the verification message; any failure
/// while applying the event answers 500 so Stripe retries.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn stripe(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = match state.webhooks.verify(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Rejected webhook delivery");
            return ApiError::bad_request(e.public_message()).into_response();
        }
    };

    match state.webhooks.handle(&event).await {
        Ok(outcome) => {
            match &outcome {
                WebhookOutcome::Applied(id) => {
                    info!(event_type = %event.event_type, subscription = %id, "Webhook applied")
                }
                other => info!(event_type = %event.event_type, outcome = ?other, "Webhook accepted"),
            }
            Json(json!({ "status": "success" })).into_response()
        }
        Err(e) => {
            error!(event_type = %event.event_type, error = %e, "Webhook handling failed");
            ApiError::internal("Webhook processing failed").into_response()
        }
    }
}
