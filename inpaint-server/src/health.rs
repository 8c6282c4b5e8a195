//! Health check endpoints for Kubernetes probes.
//!
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Same as readiness

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status; always "healthy" once the server is serving
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Edit mode: "provider" or "simulation"
    pub mode: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Provider API key configured
    pub provider_configured: bool,
}

/// Liveness probe - is the server running?
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Always 200. An unconfigured provider is not a failure: edits fall back
/// to simulation, so the endpoint still serves.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let provider_ok = state.provider.is_some();

    let status = HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        mode: if provider_ok { "provider" } else { "simulation" },
        checks: HealthChecks {
            provider_configured: provider_ok,
        },
    };

    (StatusCode::OK, Json(status))
}
