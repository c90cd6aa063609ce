//! Health endpoints.
//!
//! Kubernetes-compatible probes:
//! - `GET /health` - Liveness (is the process running?)
//! - `GET /ready` - Readiness (is the listener accepting signaling traffic?)
//!
//! Readiness flips on once the listener is bound and off again at the start
//! of shutdown so load balancers stop sending new connections.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Health state for the router process.
#[derive(Debug)]
pub struct HealthState {
    /// Whether the service is live (process running).
    live: AtomicBool,
    /// Whether the service is ready to accept connections.
    ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (live=true, ready=false).
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    /// Mark the service as ready to accept connections.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the service as not ready (e.g., during shutdown).
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Check if the service is live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Check if the service is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Create the health router with liveness and readiness endpoints.
pub fn health_router(health_state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(liveness_handler))
        .route("/ready", get(readiness_handler))
        .with_state(health_state)
}

/// Liveness probe handler.
async fn liveness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_live() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Readiness probe handler.
async fn readiness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    #[test]
    fn test_health_state_default() {
        let state = HealthState::new();
        assert!(state.is_live(), "Should be live by default");
        assert!(!state.is_ready(), "Should not be ready by default");
    }

    #[test]
    fn test_health_state_ready_transitions() {
        let state = HealthState::new();

        state.set_ready();
        assert!(state.is_ready());

        state.set_not_ready();
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_liveness_endpoint_returns_ok() {
        let state = Arc::new(HealthState::new());
        let app = health_router(state);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("Failed to build request");

        let response = app.oneshot(request).await.expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        assert!(body.is_empty(), "probes respond with status only");
    }

    #[tokio::test]
    async fn test_readiness_endpoint_not_ready() {
        let state = Arc::new(HealthState::new());
        let app = health_router(state);

        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .expect("Failed to build request");

        let response = app.oneshot(request).await.expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_readiness_endpoint_ready() {
        let state = Arc::new(HealthState::new());
        state.set_ready();
        let app = health_router(Arc::clone(&state));

        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .expect("Failed to build request");

        let response = app.oneshot(request).await.expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
