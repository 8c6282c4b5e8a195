//! # Inpaint Canvas Server Library
//!
//! Shared types and functionality for the edit server.
//! This library is used by both the binary and integration tests.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use inpaint_core::EDIT_IMAGE_PATH;

pub mod config;
pub mod edit;
pub mod health;
pub mod metrics;
pub mod provider;
pub mod validation;

pub use config::ServerConfig;
pub use edit::EditPipelineError;
pub use provider::{ProviderClient, ProviderError};

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Provider client; `None` runs every edit in simulation mode.
    pub provider: Option<ProviderClient>,
}

impl AppState {
    /// Create state around an optional provider.
    #[must_use]
    pub fn new(provider: Option<ProviderClient>) -> Self {
        Self { provider }
    }

    /// Get a reference to the optional provider client.
    #[must_use]
    pub fn provider(&self) -> Option<&ProviderClient> {
        self.provider.as_ref()
    }
}

/// Edit and health routes with the request body limit applied.
///
/// Layers for tracing, CORS and metrics are added by the binary.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(EDIT_IMAGE_PATH, post(edit::edit_image_handler))
        // Health check endpoints (Kubernetes probes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_body_limit_applies_to_edit_route() {
        let app = router(AppState::new(None), 64);
        let body = serde_json::json!({
            "image": "x".repeat(200),
            "mask": "m",
            "prompt": "p",
        })
        .to_string();
        let request = Request::post(EDIT_IMAGE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_liveness_route() {
        let app = router(AppState::new(None), 1024);
        let request = Request::get("/health/live")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
