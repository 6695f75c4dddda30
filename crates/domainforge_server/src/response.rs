//! Response envelope and error mapping.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use domainforge_error::{DomainforgeError, DomainforgeErrorKind, QuotaErrorKind};
use serde::Serialize;
use tracing::{error, warn};

/// JSON body shared by every API route.
///
/// Serializes as `{"status": "success", "data": …}` or
/// `{"status": "error", "error": "…"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    /// Request succeeded
    Success {
        /// Payload
        data: T,
    },
    /// Request failed
    Error {
        /// Caller-facing message
        error: String,
    },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiResponse::Success { .. } => StatusCode::OK,
            ApiResponse::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Wrap a payload in a success envelope.
pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::Success { data }
}

/// Handler error carrying the status code and caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    /// Error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// 400 with a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 with a message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 500 with a message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Caller-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status code for an error kind.
pub fn status_for(err: &DomainforgeError) -> StatusCode {
    match err.kind() {
        DomainforgeErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
        DomainforgeErrorKind::Auth(_) => StatusCode::UNAUTHORIZED,
        DomainforgeErrorKind::Quota(_) => StatusCode::TOO_MANY_REQUESTS,
        DomainforgeErrorKind::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
        DomainforgeErrorKind::Billing(_) => StatusCode::BAD_REQUEST,
        DomainforgeErrorKind::Provider(_)
        | DomainforgeErrorKind::Database(_)
        | DomainforgeErrorKind::Http(_)
        | DomainforgeErrorKind::Json(_)
        | DomainforgeErrorKind::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainforgeError> for ApiError {
    fn from(err: DomainforgeError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, status = status.as_u16(), "Request rejected");
        }

        let retry_after_secs = match err.kind() {
            DomainforgeErrorKind::Quota(q) => match &q.kind {
                QuotaErrorKind::RateLimited { retry_after_secs } => Some(*retry_after_secs),
                QuotaErrorKind::MonthlyLimitReached { .. } => None,
            },
            _ => None,
        };

        Self {
            status,
            message: err.public_message(),
            retry_after_secs,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse::Error {
            error: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;
