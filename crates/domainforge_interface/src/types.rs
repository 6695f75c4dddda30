//! Shared interface types.

use serde::{Deserialize, Serialize};

/// State of a dependency as reported by the health endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceStatus {
    /// Reachable and answering
    Healthy,
    /// Reachable but failing
    Unhealthy,
    /// Credentials present
    Configured,
    /// Credentials absent
    NotConfigured,
    /// Probe itself failed
    Error,
}

impl ServiceStatus {
    /// Whether this status degrades the overall health report.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ServiceStatus::Unhealthy | ServiceStatus::Error)
    }
}
