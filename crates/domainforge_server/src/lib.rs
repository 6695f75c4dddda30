//! HTTP API server for the Domainforge domain suggestion service.
//!
//! Routes:
//! - `/api/domains`: generation, availability checks and history
//! - `/auth`: identity provider proxy
//! - `/api/subscriptions`: checkout and subscription management
//! - `/webhooks/stripe`: billing events
//! - `/health`: dependency status
//!
//! [`create_router`] builds the bare router from an [`AppState`]; the binary
//! adds CORS and request tracing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bootstrap;
mod extract;
mod identity;
mod observability;
mod response;
mod routes;
mod state;

pub use bootstrap::{http_client, services_from_env};
pub use extract::{
    ApiJson, AuthenticatedUser, BearerToken, OptionalUser, SanitizedJson, USER_EMAIL_HEADER,
    bearer_token, client_ip, default_name, header_email, local_user, sanitize_str,
    sanitize_value,
};
pub use identity::{SupabaseClient, split_session};
pub use observability::{ObservabilityConfig, init_observability};
pub use response::{ApiError, ApiResponse, ApiResult, status_for, success};
pub use routes::{
    GenerateRequest, GenerateResponse, HealthReport, HistoryQuery, ServiceReport, create_router,
    rate_limit,
};
pub use state::{AppServices, AppState};
