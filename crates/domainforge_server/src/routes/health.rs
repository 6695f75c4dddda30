//! Health endpoint.

use crate::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use domainforge_interface::ServiceStatus;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Per-dependency status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Relational store
    pub database: ServiceStatus,
    /// LLM providers
    pub ai: ServiceStatus,
    /// Availability API
    pub domain_api: ServiceStatus,
    /// Payments
    pub stripe: ServiceStatus,
}

impl ServiceReport {
    /// Whether any dependency is failing.
    pub fn is_degraded(&self) -> bool {
        [self.database, self.ai, self.domain_api, self.stripe]
            .iter()
            .any(ServiceStatus::is_degraded)
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `ok` or `degraded`
    pub status: String,
    /// Report time
    pub timestamp: DateTime<Utc>,
    /// Dependency breakdown
    pub services: ServiceReport,
}

fn configured(present: bool) -> ServiceStatus {
    if present {
        ServiceStatus::Configured
    } else {
        ServiceStatus::NotConfigured
    }
}

/// Report dependency status. Always answers 200.
#[instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let database = match &state.store_health {
        Some(store) => match store.ping().await {
            Ok(()) => ServiceStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                ServiceStatus::Unhealthy
            }
        },
        None => ServiceStatus::NotConfigured,
    };

    let services = ServiceReport {
        database,
        ai: configured(state.orchestrator.is_configured()),
        domain_api: configured(state.checker.is_configured()),
        stripe: configured(state.billing.is_configured()),
    };

    let status = if services.is_degraded() { "degraded" } else { "ok" };

    Json(HealthReport {
        status: status.to_string(),
        timestamp: Utc::now(),
        services,
    })
}
