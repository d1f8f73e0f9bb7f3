//! Messaging event handling.
//!
//! ## Processing Flow
//!
//! ```text
//! body bytes → parse_payload() → serde_json::Value → extract_messages() → Extraction
//! ```
//!
//! `extract_messages` never fails: malformed parts of the payload are logged
//! and collected in [`Extraction::skipped`] while the rest is still walked.

pub mod extract;
pub mod types;

pub use extract::{extract_message, extract_messages, messaging_events, parse_payload, EventRef};
pub use types::{ExtractError, ExtractedMessage, Extraction};
