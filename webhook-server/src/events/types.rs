//! Types produced by walking a webhook event payload.
//!
//! The payload itself stays a loose `serde_json::Value`: its shape is owned by
//! the platform and is never validated against a schema. Only the results of
//! extraction are typed.

use serde::Serialize;
use thiserror::Error;

/// A message event successfully pulled out of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedMessage {
    /// Position of the enclosing entry in `entry[]`
    pub entry_index: usize,
    /// Position of the event in that entry's `messaging[]`
    pub event_index: usize,
    /// `entry.id`, the business account the event was delivered for
    pub entry_id: Option<String>,
    /// `sender.id`
    pub sender_id: String,
    /// `recipient.id`
    pub recipient_id: Option<String>,
    /// `message.mid`
    pub message_id: Option<String>,
    /// `message.text`; absent for attachment-only messages such as stickers
    pub text: Option<String>,
    /// `message.is_echo`: the business account sent this message itself
    pub is_echo: bool,
}

impl ExtractedMessage {
    /// The non-business side of the conversation.
    ///
    /// For an echo the business is the sender, so the client is the recipient.
    pub fn client_id(&self) -> Option<&str> {
        if self.is_echo {
            self.recipient_id.as_deref()
        } else {
            Some(&self.sender_id)
        }
    }
}

/// Why a part of the payload was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("payload is not a JSON object")]
    PayloadNotObject,

    #[error("`entry` is not an array")]
    EntriesNotArray,

    #[error("entry {entry} is not an object")]
    EntryNotObject { entry: usize },

    #[error("entry {entry}: `messaging` is not an array")]
    MessagingNotArray { entry: usize },

    #[error("entry {entry}, event {event}: messaging event is not an object")]
    EventNotObject { entry: usize, event: usize },

    #[error("entry {entry}, event {event}: missing `sender`")]
    MissingSender { entry: usize, event: usize },

    #[error("entry {entry}, event {event}: missing `sender.id`")]
    MissingSenderId { entry: usize, event: usize },

    #[error("entry {entry}, event {event}: `sender.id` is not a string or number")]
    InvalidSenderId { entry: usize, event: usize },

    #[error("entry {entry}, event {event}: `message` is not an object")]
    MessageNotObject { entry: usize, event: usize },
}

/// Everything one pass over a payload produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Top-level `object` field (`"instagram"`, `"page"`, ...)
    pub object: Option<String>,
    /// Message events, in payload order
    pub messages: Vec<ExtractedMessage>,
    /// Malformed parts that were skipped, in payload order
    pub skipped: Vec<ExtractError>,
    /// Messaging events without a `message` key (reads, reactions, postbacks)
    pub ignored: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.skipped.is_empty() && self.ignored == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: &str, recipient: Option<&str>, is_echo: bool) -> ExtractedMessage {
        ExtractedMessage {
            entry_index: 0,
            event_index: 0,
            entry_id: Some("biz".to_string()),
            sender_id: sender.to_string(),
            recipient_id: recipient.map(str::to_string),
            message_id: None,
            text: Some("hi".to_string()),
            is_echo,
        }
    }

    #[test]
    fn test_client_id_for_incoming_message() {
        let msg = message("client", Some("biz"), false);
        assert_eq!(msg.client_id(), Some("client"));
    }

    #[test]
    fn test_client_id_for_echo() {
        let msg = message("biz", Some("client"), true);
        assert_eq!(msg.client_id(), Some("client"));

        let msg = message("biz", None, true);
        assert_eq!(msg.client_id(), None);
    }

    #[test]
    fn test_error_messages_carry_position() {
        let err = ExtractError::MissingSender { entry: 1, event: 2 };
        assert_eq!(err.to_string(), "entry 1, event 2: missing `sender`");
    }

    #[test]
    fn test_extracted_message_serialization() {
        let json = serde_json::to_value(message("U1", None, false)).unwrap();
        assert_eq!(json["sender_id"], "U1");
        assert_eq!(json["text"], "hi");
        assert!(json["recipient_id"].is_null());
    }
}
