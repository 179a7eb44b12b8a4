//! Outbound bot platform API surface.
//!
//! The platform client itself is an external collaborator. It is reached
//! through the single-method [`BotApi`] trait: a method name and a JSON
//! parameter object go in, a JSON result or an [`ApiError`] comes out.
//!
//! [`BotApiExt`] layers typed calls on top of it for every method the
//! dispatcher uses:
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `answerCallbackQuery` | [`AnswerCallbackQueryParams`] | `bool` |
//! | `sendMessage` | [`SendMessageParams`] | [`Message`] |
//! | `editMessageText` | [`EditMessageTextParams`] | [`Message`] |
//! | `editMessageMedia` | [`EditMessageMediaParams`] | [`Message`] |
//! | `setMessageReaction` | [`SetMessageReactionParams`] | `bool` |
//! | `deleteMessage` | [`DeleteMessageParams`] | `bool` |
//! | `setMyCommands` | [`SetMyCommandsParams`] | `bool` |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::SetMyCommandsParams;
use crate::error::{ApiError, ApiResult};
use crate::query::Query;
use crate::update::Message;

/// `answerCallbackQuery`
pub const ANSWER_CALLBACK_QUERY: &str = "answerCallbackQuery";
/// `sendMessage`
pub const SEND_MESSAGE: &str = "sendMessage";
/// `editMessageText`
pub const EDIT_MESSAGE_TEXT: &str = "editMessageText";
/// `editMessageMedia`
pub const EDIT_MESSAGE_MEDIA: &str = "editMessageMedia";
/// `setMessageReaction`
pub const SET_MESSAGE_REACTION: &str = "setMessageReaction";
/// `deleteMessage`
pub const DELETE_MESSAGE: &str = "deleteMessage";
/// `setMyCommands`
pub const SET_MY_COMMANDS: &str = "setMyCommands";

// =============================================================================
// BotApi: the client boundary
// =============================================================================

/// RPC-style access to the bot platform.
///
/// Calls are synchronous: dispatch runs on the caller's thread and a handler
/// that calls the platform blocks that dispatch until the call returns.
/// Implementations must be shareable across concurrently running dispatches.
pub trait BotApi: Send + Sync {
    /// Calls a platform method.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`ApiError::NotSupported`].
    fn call(&self, method: &str, _params: Value) -> ApiResult<Value> {
        Err(ApiError::NotSupported(method.to_string()))
    }
}

/// Typed calls over any [`BotApi`].
pub trait BotApiExt: BotApi {
    /// Serializes `params`, calls `method` and deserializes the result.
    fn invoke<P, R>(&self, method: &str, params: &P) -> ApiResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let result = self.call(method, params)?;
        Ok(serde_json::from_value(result)?)
    }

    /// <https://core.telegram.org/bots/api#answercallbackquery>
    fn answer_callback_query(&self, params: &AnswerCallbackQueryParams) -> ApiResult<bool> {
        self.invoke(ANSWER_CALLBACK_QUERY, params)
    }

    /// <https://core.telegram.org/bots/api#sendmessage>
    fn send_message(&self, params: &SendMessageParams) -> ApiResult<Message> {
        self.invoke(SEND_MESSAGE, params)
    }

    /// <https://core.telegram.org/bots/api#editmessagetext>
    fn edit_message_text(&self, params: &EditMessageTextParams) -> ApiResult<Message> {
        self.invoke(EDIT_MESSAGE_TEXT, params)
    }

    /// <https://core.telegram.org/bots/api#editmessagemedia>
    fn edit_message_media(&self, params: &EditMessageMediaParams) -> ApiResult<Message> {
        self.invoke(EDIT_MESSAGE_MEDIA, params)
    }

    /// <https://core.telegram.org/bots/api#setmessagereaction>
    fn set_message_reaction(&self, params: &SetMessageReactionParams) -> ApiResult<bool> {
        self.invoke(SET_MESSAGE_REACTION, params)
    }

    /// <https://core.telegram.org/bots/api#deletemessage>
    fn delete_message(&self, params: &DeleteMessageParams) -> ApiResult<bool> {
        self.invoke(DELETE_MESSAGE, params)
    }

    /// <https://core.telegram.org/bots/api#setmycommands>
    fn set_my_commands(&self, params: &SetMyCommandsParams) -> ApiResult<bool> {
        self.invoke(SET_MY_COMMANDS, params)
    }
}

impl<T: BotApi + ?Sized> BotApiExt for T {}

// =============================================================================
// Shared parameter types
// =============================================================================

/// Target chat: a numeric identifier or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Numeric chat identifier.
    Id(i64),
    /// `@channelusername`.
    Username(String),
}

impl Default for ChatId {
    fn default() -> Self {
        Self::Id(0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        Self::Username(username.to_string())
    }
}

/// Text formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    #[serde(rename = "Markdown")]
    Markdown,
}

/// One button of an inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label text.
    pub text: String,
    /// Payload sent back in a callback query when pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    /// URL opened when pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    /// A button whose callback payload is the canonical encoding of `query`.
    pub fn callback(text: impl Into<String>, query: &Query) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(query.encode()),
            url: None,
        }
    }

    /// A button opening `url`.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

/// An inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Appends a row of buttons.
    pub fn row(mut self, buttons: impl IntoIterator<Item = InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons.into_iter().collect());
        self
    }
}

/// Media kinds accepted by `editMessageMedia`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMediaKind {
    Photo,
    Video,
    Animation,
    Audio,
    Document,
}

/// New media content for a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMedia {
    #[serde(rename = "type")]
    pub kind: InputMediaKind,
    /// File identifier or URL.
    pub media: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

/// A reaction on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactionType {
    /// A standard emoji reaction.
    Emoji { emoji: String },
    /// A custom emoji reaction.
    CustomEmoji { custom_emoji_id: String },
}

// =============================================================================
// Method parameters
// =============================================================================

/// Parameters of `answerCallbackQuery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerCallbackQueryParams {
    pub callback_query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u32>,
}

/// Parameters of `sendMessage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendMessageParams {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable_notification: bool,
}

impl SendMessageParams {
    /// Creates parameters for a plain text message.
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Parameters of `editMessageText`.
///
/// Either `chat_id` and `message_id`, or `inline_message_id`, identify the message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditMessageTextParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Parameters of `editMessageMedia`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMessageMediaParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    pub media: InputMedia,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Parameters of `setMessageReaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetMessageReactionParams {
    pub chat_id: ChatId,
    pub message_id: i64,
    #[serde(default)]
    pub reaction: Vec<ReactionType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_big: bool,
}

/// Parameters of `deleteMessage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteMessageParams {
    pub chat_id: ChatId,
    pub message_id: i64,
}
