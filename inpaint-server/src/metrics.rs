//! Prometheus metrics for inpaint-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const EDIT_REQUESTS_TOTAL: &str = "inpaint_edit_requests_total";
const EDIT_REQUEST_DURATION: &str = "inpaint_edit_request_duration_seconds";
const PROVIDER_CALL_DURATION: &str = "inpaint_provider_call_duration_seconds";
const VALIDATION_FAILURES_TOTAL: &str = "inpaint_validation_failures_total";

/// How an edit request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Provider returned an edit.
    Success,
    /// Provider refused or is not configured; simulated edit returned.
    ProviderFallback,
    /// A later stage failed; original image echoed back.
    EchoFallback,
    /// Request failed validation (400).
    Rejected,
    /// Body could not be parsed (500).
    Failed,
}

impl EditOutcome {
    /// Label value used in metrics and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ProviderFallback => "provider_fallback",
            Self::EchoFallback => "echo_fallback",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a finished edit request.
///
/// # Arguments
///
/// * `outcome` - How the request was answered
/// * `duration_secs` - Handler duration in seconds
pub fn record_edit_request(outcome: EditOutcome, duration_secs: f64) {
    counter!(EDIT_REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(EDIT_REQUEST_DURATION, "outcome" => outcome.as_str()).record(duration_secs);
}

/// Record the latency of one provider call, successful or not.
pub fn record_provider_latency(duration_secs: f64) {
    histogram!(PROVIDER_CALL_DURATION).record(duration_secs);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (e.g. missing_fields)
pub fn record_validation_failure(validation_type: &'static str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type
    )
    .increment(1);
}
