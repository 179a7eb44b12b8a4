//! # Courier Core
//!
//! Leaf types of the Courier update dispatcher.
//!
//! This crate has no knowledge of routing or execution. It provides the
//! vocabulary the router is written in:
//!
//! - **Query codec**: the `command key=v1,v2 flag` micro-language ([`Query`])
//! - **Patterns**: the `*`/`$` pattern language and its scoring [`Matcher`]
//! - **Updates**: the inbound event envelope ([`Update`], [`Channel`])
//! - **Platform API**: the outbound RPC boundary ([`BotApi`], [`BotApiExt`])
//! - **Command descriptions**: command menus per scope and language ([`CommandDescriber`])
//! - **Text**: rewrite chains and HTML flattening ([`Replacer`], [`escape_html`])
//!
//! ```text
//!             ┌──────────────┐
//! Update ────▶│ dispatch text│──▶ Matcher::score ──▶ best registration
//!             └──────────────┘
//!                    │
//!                    ▼
//!              Query::decode ──▶ handler parameters
//! ```

pub mod api;
pub mod commands;
pub mod error;
pub mod pattern;
pub mod query;
pub mod text;
pub mod update;

pub use api::{
    AnswerCallbackQueryParams, BotApi, BotApiExt, ChatId, DeleteMessageParams,
    EditMessageMediaParams, EditMessageTextParams, InlineKeyboardButton, InlineKeyboardMarkup,
    InputMedia, InputMediaKind, ParseMode, ReactionType, SendMessageParams,
    SetMessageReactionParams,
};
pub use commands::{
    BotCommand, CommandDescriber, CommandDescription, CommandScope, LanguageCode,
    SetMyCommandsParams,
};
pub use error::{ApiError, ApiResult, PatternError, PatternResult};
pub use pattern::{Matcher, Pattern};
pub use query::Query;
pub use text::{Replacer, TextReplacer, escape_html};
pub use update::{CallbackQuery, Channel, Chat, InlineQuery, Message, Update, User};
