//! Route table.

mod auth;
mod domains;
mod health;
mod subscriptions;
mod webhooks;

pub use domains::{GenerateRequest, GenerateResponse, HistoryQuery};
pub use health::{HealthReport, ServiceReport};

use crate::{AppState, ApiError, client_ip};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use domainforge_error::{DomainforgeError, QuotaError, QuotaErrorKind};
use domainforge_rate_limit::{IpRateLimiter, RateLimitDecision};
use std::sync::Arc;
use tracing::warn;

/// Reject requests from peers that exhausted their window.
pub async fn rate_limit(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.extensions());
    match limiter.check(&ip) {
        RateLimitDecision::Allowed { .. } => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            warn!(%ip, path = %request.uri().path(), retry_after_secs, "Rate limit exceeded");
            let err = DomainforgeError::from(QuotaError::new(QuotaErrorKind::RateLimited {
                retry_after_secs,
            }));
            ApiError::from(err).into_response()
        }
    }
}

/// Creates the API router.
///
/// Layers for CORS and request tracing are added by the binary so tests can
/// drive the bare router.
pub fn create_router(state: AppState) -> Router {
    let domains = Router::new()
        .route("/generate", post(domains::generate))
        .route("/check-availability", post(domains::check_availability))
        .route(
            "/batch-check-availability",
            post(domains::batch_check_availability),
        )
        .route("/history", get(domains::history))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.domain_limiter),
            rate_limit,
        ));

    let auth = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/user", get(auth::current_user))
        .route("/logout", post(auth::logout));

    let subscriptions = Router::new()
        .route("/checkout", post(subscriptions::checkout))
        .route("/current", get(subscriptions::current))
        .route("/details", get(subscriptions::details))
        .route("/cancel", post(subscriptions::cancel))
        .route("/upgrade", post(subscriptions::upgrade))
        .route("/reactivate", post(subscriptions::reactivate))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.subscription_limiter),
            rate_limit,
        ));

    Router::new()
        .nest("/api/domains", domains)
        .nest("/auth", auth)
        .nest("/api/subscriptions", subscriptions)
        .route("/webhooks/stripe", post(webhooks::stripe))
        .route("/health", get(health::health))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::new(axum::http::StatusCode::NOT_FOUND, "Not found")
}
