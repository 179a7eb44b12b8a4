//! Inbound update envelope.
//!
//! An [`Update`] carries at most one of the dispatchable kinds (message,
//! callback query, inline query). Every other update kind the platform may
//! deliver is kept verbatim in [`Update::other`] so custom predicates can
//! classify it.
//!
//! ```text
//! Update { update_id }
//! ├── message         → Channel::Text      (dispatch text: message.text)
//! ├── callback_query  → Channel::Callback  (dispatch text: callback_query.data)
//! ├── inline_query    → Channel::Inline    (dispatch text: inline_query.query)
//! └── other           → Channel::Custom    (no dispatch text)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Shared Types
// ============================================================================

/// A platform user or bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username, without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier.
    pub id: i64,
    /// Chat type ("private", "group", "supergroup", "channel").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Title, for groups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Username, for private chats and public groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ============================================================================
// Dispatchable Kinds
// ============================================================================

/// A chat message.
///
/// A message the bot can no longer access is delivered with `date == 0`;
/// only `id` and `chat` are meaningful then.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier inside the chat.
    #[serde(rename = "message_id")]
    pub id: i64,
    /// Sender. Absent for messages sent to channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// The chat the message belongs to.
    pub chat: Chat,
    /// Unix time the message was sent.
    #[serde(default)]
    pub date: i64,
    /// UTF-8 text of the message.
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// Returns `true` if the message content is still accessible.
    pub fn is_accessible(&self) -> bool {
        self.date != 0
    }
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Unique identifier, used to answer the query.
    pub id: String,
    /// The user who pressed the button.
    pub from: User,
    /// The message the button was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Identifier of the inline message the button was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    /// Global identifier of the chat the message was sent to.
    #[serde(default)]
    pub chat_instance: String,
    /// Callback payload attached to the button.
    #[serde(default)]
    pub data: String,
}

/// An incoming inline query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineQuery {
    /// Unique identifier.
    pub id: String,
    /// The user who sent the query.
    pub from: User,
    /// Text of the query.
    #[serde(default)]
    pub query: String,
    /// Offset of the results to return.
    #[serde(default)]
    pub offset: String,
}

// ============================================================================
// Update
// ============================================================================

/// The event category that selects which registry is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Text messages.
    Text,
    /// Callback queries.
    Callback,
    /// Inline queries.
    Inline,
    /// Anything else; matched by predicates only.
    Custom,
}

impl Channel {
    /// Returns the channel name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Callback => "callback",
            Self::Inline => "inline",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound occurrence from the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    #[serde(default)]
    pub update_id: i64,
    /// A new incoming message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// A new incoming callback query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
    /// A new incoming inline query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_query: Option<InlineQuery>,
    /// Every other update kind, keyed by its field name.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Update {
    /// Returns the channel of this update.
    ///
    /// The order is fixed: message, then callback query, then inline query.
    pub fn channel(&self) -> Channel {
        self.dispatch_text()
            .map(|(channel, _)| channel)
            .unwrap_or(Channel::Custom)
    }

    /// Returns the channel and the text used for pattern matching.
    ///
    /// Returns `None` for updates that only carry [`Update::other`] kinds.
    pub fn dispatch_text(&self) -> Option<(Channel, &str)> {
        if let Some(message) = &self.message {
            return Some((Channel::Text, &message.text));
        }
        if let Some(callback) = &self.callback_query {
            return Some((Channel::Callback, &callback.data));
        }
        if let Some(inline) = &self.inline_query {
            return Some((Channel::Inline, &inline.query));
        }
        None
    }

    /// Returns the user who caused this update, if any.
    pub fn from_user(&self) -> Option<&User> {
        if let Some(message) = &self.message {
            return message.from.as_ref();
        }
        if let Some(callback) = &self.callback_query {
            return Some(&callback.from);
        }
        self.inline_query.as_ref().map(|inline| &inline.from)
    }

    /// Returns `true` if the update carries an unrecognised kind named `kind`.
    pub fn has_other(&self, kind: &str) -> bool {
        self.other.contains_key(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_message_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 7,
                    "from": {"id": 42, "is_bot": false, "first_name": "Ann"},
                    "chat": {"id": 42, "type": "private"},
                    "date": 1700000000,
                    "text": "/start now"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(update.update_id, 10);
        assert_eq!(update.dispatch_text(), Some((Channel::Text, "/start now")));
        assert_eq!(update.from_user().map(|u| u.id), Some(42));
        let message = update.message.as_ref().unwrap();
        assert_eq!(message.id, 7);
        assert_eq!(message.chat.kind, "private");
        assert!(message.is_accessible());
        assert!(update.other.is_empty());
    }

    #[test]
    fn test_deserialize_callback_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 11,
                "callback_query": {
                    "id": "cb-1",
                    "from": {"id": 5, "first_name": "Bob"},
                    "message": {"message_id": 3, "chat": {"id": -100, "type": "group"}, "date": 0},
                    "chat_instance": "ci",
                    "data": "menu page=help"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(update.channel(), Channel::Callback);
        assert_eq!(update.dispatch_text(), Some((Channel::Callback, "menu page=help")));
        let message = update.callback_query.as_ref().unwrap().message.as_ref().unwrap();
        assert!(!message.is_accessible());
        assert_eq!(message.chat.id, -100);
    }

    #[test]
    fn test_deserialize_inline_update() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 12, "inline_query": {"id": "q", "from": {"id": 9}, "query": "cats", "offset": ""}}"#,
        )
        .unwrap();

        assert_eq!(update.dispatch_text(), Some((Channel::Inline, "cats")));
        assert_eq!(update.from_user().map(|u| u.id), Some(9));
    }

    #[test]
    fn test_unknown_kinds_are_kept() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 13, "chat_member": {"chat": {"id": 1, "type": "group"}}}"#,
        )
        .unwrap();

        assert_eq!(update.channel(), Channel::Custom);
        assert_eq!(update.dispatch_text(), None);
        assert_eq!(update.from_user(), None);
        assert!(update.has_other("chat_member"));
    }

    #[test]
    fn test_message_takes_precedence() {
        let update = Update {
            message: Some(Message {
                text: "hello".into(),
                ..Default::default()
            }),
            inline_query: Some(InlineQuery {
                query: "ignored".into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(update.dispatch_text(), Some((Channel::Text, "hello")));
    }
}
