//! Ardan - Instagram messaging webhook receiver.
//!
//! This library provides the pieces of the `ardan-webhook` binary:
//! - `config`: immutable configuration loaded from the environment
//! - `events`: message extraction from delivered event payloads
//! - `web`: the axum router, handshake and delivery handlers
//!
//! ## Architecture
//!
//! ```text
//! Platform → GET  /webhook → verify_subscription → 200 challenge | 403
//!          → POST /webhook → parse_payload → extract_messages → logs, 200 EVENT_RECEIVED
//! ```

pub mod config;
pub mod events;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use events::{extract_messages, parse_payload, ExtractError, ExtractedMessage, Extraction};
pub use web::{router, AppState};
