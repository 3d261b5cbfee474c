//! Inbound webhook updates.
//!
//! Only the handful of fields the dispatcher reads are modelled; everything
//! else in the Bot API payload is ignored.

use std::fmt;

use serde::Deserialize;

#[derive(Deserialize)]
struct RawUpdate {
    message: Option<RawMessage>,
    callback_query: Option<RawCallbackQuery>,
}

#[derive(Deserialize)]
struct RawMessage {
    chat: RawChat,
    from: Option<RawUser>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawCallbackQuery {
    id: String,
    message: Option<RawCallbackMessage>,
    data: Option<String>,
}

#[derive(Deserialize)]
struct RawCallbackMessage {
    message_id: i64,
    chat: RawChat,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Deserialize)]
struct RawUser {
    first_name: String,
}

/// One inbound event from Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Message(IncomingMessage),
    CallbackQuery(IncomingCallback),
    /// Edited messages, channel posts, member updates and so on.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub sender_name: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub id: String,
    /// Absent for buttons on inline-mode messages.
    pub origin: Option<CallbackOrigin>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackOrigin {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed update: {}", self.0)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl Update {
    /// Decode a webhook body. The body must be a JSON object.
    pub fn from_json(body: &str) -> Result<Self, DecodeError> {
        Self::from_slice(body.as_bytes())
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawUpdate = serde_json::from_slice(body).map_err(DecodeError)?;
        Ok(raw.into())
    }
}

impl From<RawUpdate> for Update {
    fn from(raw: RawUpdate) -> Self {
        // Telegram never sets both; a message wins if it ever does.
        if let Some(msg) = raw.message {
            return Update::Message(IncomingMessage {
                chat_id: msg.chat.id,
                sender_name: msg.from.map(|u| u.first_name),
                text: msg.text,
            });
        }

        if let Some(cb) = raw.callback_query {
            return Update::CallbackQuery(IncomingCallback {
                id: cb.id,
                origin: cb.message.map(|m| CallbackOrigin {
                    chat_id: m.chat.id,
                    message_id: m.message_id,
                }),
                data: cb.data,
            });
        }

        Update::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let update = Update::from_json(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 5,
                    "date": 1700000000,
                    "chat": {"id": 42, "type": "private"},
                    "from": {"id": 7, "is_bot": false, "first_name": "Alice"},
                    "text": "hello"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            update,
            Update::Message(IncomingMessage {
                chat_id: 42,
                sender_name: Some("Alice".to_string()),
                text: Some("hello".to_string()),
            })
        );
    }

    #[test]
    fn test_photo_message_has_no_text() {
        let update = Update::from_json(
            r#"{"update_id": 1, "message": {"chat": {"id": -100}, "photo": [{"file_id": "x"}]}}"#,
        )
        .unwrap();

        assert!(matches!(update, Update::Message(IncomingMessage { text: None, sender_name: None, .. })));
    }

    #[test]
    fn test_callback_query() {
        let update = Update::from_json(
            r#"{
                "update_id": 11,
                "callback_query": {
                    "id": "cb-1",
                    "from": {"id": 7, "first_name": "Bob"},
                    "message": {"message_id": 99, "chat": {"id": 42}},
                    "data": "examples"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            update,
            Update::CallbackQuery(IncomingCallback {
                id: "cb-1".to_string(),
                origin: Some(CallbackOrigin { chat_id: 42, message_id: 99 }),
                data: Some("examples".to_string()),
            })
        );
    }

    #[test]
    fn test_inline_callback_has_no_origin() {
        let update = Update::from_json(
            r#"{"callback_query": {"id": "cb-2", "inline_message_id": "abc", "data": "help"}}"#,
        )
        .unwrap();

        match update {
            Update::CallbackQuery(cb) => assert!(cb.origin.is_none()),
            other => panic!("expected callback, got {:?}", other),
        }
    }

    #[test]
    fn test_other_update_kinds_are_unsupported() {
        assert_eq!(Update::from_json("{}").unwrap(), Update::Unsupported);
        assert_eq!(
            Update::from_json(r#"{"update_id": 3, "edited_message": {"chat": {"id": 1}}}"#).unwrap(),
            Update::Unsupported
        );
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Update::from_json("{not json").is_err());
        assert!(Update::from_json("").is_err());
        assert!(Update::from_slice(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_non_object_json_is_error() {
        assert!(Update::from_json("[]").is_err());
        assert!(Update::from_json("42").is_err());
        assert!(Update::from_json("null").is_err());
    }

    #[test]
    fn test_message_without_chat_is_error() {
        let err = Update::from_json(r#"{"message": {"text": "hi"}}"#).unwrap_err();
        assert!(err.to_string().contains("malformed update"));
    }
}
