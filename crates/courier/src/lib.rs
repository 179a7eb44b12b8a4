//! # Courier
//!
//! Routes chat-platform updates (messages, button callbacks, inline
//! queries) to chains of synchronous handlers by matching their text
//! against registered patterns.
//!
//! ```text
//! ┌──────────┐    ┌────────┐    ┌──────────────────────────────────────┐
//! │ Webhook  │───▶│ Router │───▶│ middlewares ─▶ best-scoring chain    │──▶ BotApi
//! │ (axum)   │    │        │    │ (pooled Context, one per update)     │
//! └──────────┘    └────────┘    └──────────────────────────────────────┘
//! ```
//!
//! - **Core** ([`core`]): query codec, patterns, update model, API surface
//! - **Router** ([`router`]): registries, context, middlewares, dispatch
//! - **Runtime** ([`runtime`]): configuration, logging, webhook serving
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use courier::prelude::*;
//!
//! fn start(ctx: &mut Context) {
//!     if let Err(err) = ctx.respond_private_message_text("Hi!") {
//!         ctx.error(err);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     init_from_config(&config.logging);
//!
//!     let mut router = config.router.apply(Router::new().with_client(my_client()));
//!     router.use_middleware([recover(), auto_answer_callback_query()]);
//!     router.text("/start", [handler(start)])?.describe(LanguageCode::ALL, CommandScope::Default, "Say hello");
//!
//!     serve(Arc::new(router), &config.webhook, shutdown_token()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http-server` *(default)*: axum webhook entry point
//! - `toml-config` *(default)*: `courier.toml` configuration files
//! - `yaml-config`: `courier.yaml` configuration files
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_router as router;
pub use courier_runtime as runtime;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Routing
    pub use courier_router::{
        Context, DispatchError, DispatchOutcome, DispatchResult, Handler, Router, handler,
    };
    pub use courier_router::{auto_accept, auto_answer_callback_query, recover};

    // Update model and platform calls
    pub use courier_core::{
        BotApi, BotApiExt, CallbackQuery, ChatId, CommandScope, InlineKeyboardButton,
        InlineKeyboardMarkup, LanguageCode, Message, Query, SendMessageParams, Update,
    };

    // Hosting
    pub use courier_runtime::logging::init_from_config;
    pub use courier_runtime::{ConfigLoader, CourierConfig, shutdown_token};
    #[cfg(feature = "http-server")]
    pub use courier_runtime::{serve, webhook_router};
}
