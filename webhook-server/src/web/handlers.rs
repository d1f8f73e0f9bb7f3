//! Webhook endpoint handlers.
//!
//! `GET /webhook` answers the subscription handshake. `POST /webhook` logs the
//! delivered events and always acknowledges with `200 EVENT_RECEIVED`: the
//! platform only needs to know delivery happened, and a non-200 would make it
//! redeliver the same payload.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::events::{extract_messages, parse_payload, Extraction};
use crate::web::verification::verify_subscription;
use crate::Config;

/// Body returned for every accepted event delivery.
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Body returned for a rejected handshake.
pub const VERIFICATION_FAILED: &str = "Verification failed";

const BODY_PREVIEW_BYTES: usize = 500;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Verification Handshake
// =============================================================================

/// Handshake query parameters. All of them are optional.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Verification handshake endpoint.
///
/// A query string that fails to decode is treated like one with no
/// parameters, so it is rejected with 403 rather than 400.
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Option<Query<VerifyQuery>>,
) -> impl IntoResponse {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    match verify_subscription(
        query.mode.as_deref(),
        query.verify_token.as_deref(),
        query.challenge.as_deref(),
        state.config.verify_token.as_deref(),
    ) {
        Some(challenge) => {
            info!(challenge_length = challenge.len(), "WEBHOOK_VERIFIED");
            (StatusCode::OK, challenge.to_string())
        }
        None => {
            warn!(
                mode = ?query.mode,
                has_token = query.verify_token.is_some(),
                "webhook_verification_failed"
            );
            (StatusCode::FORBIDDEN, VERIFICATION_FAILED.to_string())
        }
    }
}

// =============================================================================
// Event Delivery
// =============================================================================

/// Event delivery endpoint.
///
/// The body is taken as raw bytes so that a missing content type or a body
/// that is not JSON still reaches this handler and gets acknowledged.
pub async fn receive_webhook(body: Bytes) -> impl IntoResponse {
    let extraction = process_event_body(&body);

    info!(
        messages = extraction.messages.len(),
        skipped = extraction.skipped.len(),
        ignored = extraction.ignored,
        "webhook_event_processed"
    );

    (StatusCode::OK, EVENT_RECEIVED)
}

/// Parse and walk an event delivery body.
///
/// Never fails. An unparsable body yields an empty [`Extraction`].
pub fn process_event_body(body: &[u8]) -> Extraction {
    let payload = match parse_payload(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(
                error = %e,
                body_length = body.len(),
                body_preview = %body_preview(body),
                "webhook_payload_unparsable"
            );
            return Extraction::default();
        }
    };

    info!(
        body_length = body.len(),
        object = payload.get("object").and_then(|o| o.as_str()).unwrap_or("unknown"),
        body_preview = %body_preview(body),
        "webhook_event_received"
    );

    extract_messages(&payload)
}

fn body_preview(body: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_BYTES)])
}
