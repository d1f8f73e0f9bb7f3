//! Web server module for the messaging webhook.
//!
//! This module provides a small web server that:
//! - Answers the platform's subscription handshake on `GET /webhook`
//! - Accepts event deliveries on `POST /webhook`, logs the messages inside
//!   them and always acknowledges with 200
//! - Exposes `GET /health` for liveness probes

pub mod handlers;
pub mod verification;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use handlers::{
    health, process_event_body, receive_webhook, verify_webhook, AppState, HealthResponse,
    VerifyQuery, EVENT_RECEIVED, VERIFICATION_FAILED,
};
pub use verification::{is_verification_enabled, verify_subscription};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
