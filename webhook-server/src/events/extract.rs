//! Message extraction from messaging webhook payloads.
//!
//! Payload shape, as delivered by the platform:
//!
//! ```text
//! { "object": "instagram",
//!   "entry": [ { "id": "<business id>", "time": 0,
//!                "messaging": [ { "sender": { "id": "..." },
//!                                 "recipient": { "id": "..." },
//!                                 "message": { "mid": "...", "text": "...", "is_echo": false } } ] } ] }
//! ```
//!
//! Nothing here is schema-checked. Missing optional fields become `None`;
//! malformed parts become an [`ExtractError`] and the walk moves on.

use serde_json::Value;
use tracing::{info, warn};

use crate::events::types::{ExtractError, ExtractedMessage, Extraction};

/// One messaging event located inside the payload, borrowed from it.
#[derive(Debug, Clone, Copy)]
pub struct EventRef<'a> {
    pub entry_index: usize,
    pub event_index: usize,
    pub entry: &'a Value,
    pub event: &'a Value,
}

/// Parse a raw request body into a loose JSON tree.
pub fn parse_payload(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Lazily walk `entry[]` and then each entry's `messaging[]`, in array order.
///
/// Malformed containers are yielded as errors in the position they were met,
/// so a bad entry does not hide the entries after it.
pub fn messaging_events(
    payload: &Value,
) -> impl Iterator<Item = Result<EventRef<'_>, ExtractError>> + '_ {
    let (entries, payload_error) = match entries(payload) {
        Ok(entries) => (entries, None),
        Err(e) => (&[] as &[Value], Some(e)),
    };

    payload_error.map(Err).into_iter().chain(
        entries
            .iter()
            .enumerate()
            .flat_map(|(entry_index, entry)| {
                let (events, entry_error) = match messaging(entry_index, entry) {
                    Ok(events) => (events, None),
                    Err(e) => (&[] as &[Value], Some(e)),
                };

                entry_error.map(Err).into_iter().chain(
                    events
                        .iter()
                        .enumerate()
                        .map(move |(event_index, event)| {
                            Ok(EventRef {
                                entry_index,
                                event_index,
                                entry,
                                event,
                            })
                        }),
                )
            }),
    )
}

/// Extract a single messaging event.
///
/// Returns `Ok(None)` for events that carry no `message` key (reads,
/// reactions, postbacks). A `message` without `text` is still a message.
pub fn extract_message(event: EventRef<'_>) -> Result<Option<ExtractedMessage>, ExtractError> {
    let (entry, ev) = (event.entry_index, event.event_index);

    let fields = event
        .event
        .as_object()
        .ok_or(ExtractError::EventNotObject { entry, event: ev })?;

    let Some(message) = fields.get("message") else {
        return Ok(None);
    };

    let sender = fields
        .get("sender")
        .filter(|s| !s.is_null())
        .ok_or(ExtractError::MissingSender { entry, event: ev })?;

    let sender_id = match sender.get("id") {
        None | Some(Value::Null) => return Err(ExtractError::MissingSenderId { entry, event: ev }),
        Some(id) => id_string(id).ok_or(ExtractError::InvalidSenderId { entry, event: ev })?,
    };

    let message = message
        .as_object()
        .ok_or(ExtractError::MessageNotObject { entry, event: ev })?;

    Ok(Some(ExtractedMessage {
        entry_index: entry,
        event_index: ev,
        entry_id: event.entry.get("id").and_then(id_string),
        sender_id,
        recipient_id: fields
            .get("recipient")
            .and_then(|r| r.get("id"))
            .and_then(id_string),
        message_id: message.get("mid").and_then(Value::as_str).map(str::to_owned),
        text: message.get("text").and_then(Value::as_str).map(str::to_owned),
        is_echo: message
            .get("is_echo")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }))
}

/// Walk a whole payload, logging every message and every skipped part once.
pub fn extract_messages(payload: &Value) -> Extraction {
    let mut extraction = Extraction {
        object: payload
            .get("object")
            .and_then(Value::as_str)
            .map(str::to_owned),
        ..Default::default()
    };

    for item in messaging_events(payload) {
        match item.and_then(extract_message) {
            Ok(Some(message)) => {
                info!(
                    sender_id = %message.sender_id,
                    text = ?message.text,
                    client_id = ?message.client_id(),
                    entry_id = ?message.entry_id,
                    message_id = ?message.message_id,
                    is_echo = message.is_echo,
                    "webhook_message_received"
                );
                extraction.messages.push(message);
            }
            Ok(None) => extraction.ignored += 1,
            Err(e) => {
                warn!(error = %e, "webhook_event_skipped");
                extraction.skipped.push(e);
            }
        }
    }

    extraction
}

fn entries(payload: &Value) -> Result<&[Value], ExtractError> {
    let fields = payload.as_object().ok_or(ExtractError::PayloadNotObject)?;

    match fields.get("entry") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(ExtractError::EntriesNotArray),
    }
}

fn messaging(entry_index: usize, entry: &Value) -> Result<&[Value], ExtractError> {
    let fields = entry.as_object().ok_or(ExtractError::EntryNotObject {
        entry: entry_index,
    })?;

    match fields.get("messaging") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(events)) => Ok(events),
        Some(_) => Err(ExtractError::MessagingNotArray { entry: entry_index }),
    }
}

/// Platform ids are strings, but accept bare numbers too.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
