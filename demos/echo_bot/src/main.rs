//! Echo Bot Demo
//!
//! Serves a webhook and answers a handful of commands. Outbound platform
//! calls are only logged, so the bot can be driven with plain `curl`:
//!
//! ```bash
//! cargo run --package echo-bot -- --port 8080
//! curl -X POST localhost:8080/webhook -d '{"update_id":1,"message":{"message_id":1,"date":0,
//!   "chat":{"id":1,"type":"private"},"from":{"id":1,"is_bot":false,"first_name":"A"},"text":"/echo hi"}}'
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use clap::Parser;
use courier::core::api::{EDIT_MESSAGE_TEXT, SEND_MESSAGE};
use courier::core::{ApiResult, EditMessageTextParams};
use courier::prelude::*;
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(about = "Echo bot served over a webhook")]
struct Args {
    /// Configuration file (defaults to ./courier.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `webhook.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Captures raw request bodies for handlers.
    #[arg(long)]
    debug: bool,
}

// ============================================================================
// Platform client
// ============================================================================

/// Logs every call instead of reaching the platform.
#[derive(Default)]
struct LoggingApi {
    next_message_id: AtomicI64,
}

impl BotApi for LoggingApi {
    fn call(&self, method: &str, params: Value) -> ApiResult<Value> {
        info!(method, %params, "Platform call");

        Ok(match method {
            SEND_MESSAGE | EDIT_MESSAGE_TEXT => {
                let id = params["message_id"]
                    .as_i64()
                    .unwrap_or_else(|| self.next_message_id.fetch_add(1, Ordering::Relaxed) + 1);
                json!({
                    "message_id": id,
                    "date": 0,
                    "chat": {"id": params["chat_id"], "type": "private"},
                    "text": params["text"],
                })
            }
            _ => json!(true),
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default()
        .row([
            InlineKeyboardButton::callback("Help", &Query::command("menu").with_param("page", "help")),
            InlineKeyboardButton::callback("About", &Query::command("menu").with_param("page", "about")),
        ])
        .row([InlineKeyboardButton::callback("Close", &Query::command("close"))])
}

fn start(ctx: &mut Context) {
    let params = SendMessageParams {
        text: "Welcome! Pick a page:".into(),
        reply_markup: Some(menu_keyboard()),
        ..Default::default()
    };
    if let Err(err) = ctx.respond_private_message(params) {
        ctx.error(err);
    }
}

fn echo(ctx: &mut Context) {
    let text = ctx
        .text()
        .and_then(|text| text.strip_prefix("/echo"))
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let result = if text.is_empty() {
        ctx.respond_reaction_emoji("🤔").map(drop)
    } else {
        ctx.respond_private_message_text(text).map(drop)
    };
    if let Err(err) = result {
        ctx.error(err);
    }
}

fn menu(ctx: &mut Context) {
    let page = ctx.query().and_then(|q| q.get("page").map(str::to_owned));
    let text = match page.as_deref() {
        Some("help") => "/start - show the menu\n/echo <text> - echo text back",
        Some("about") => "A demo of pattern-routed dispatch.",
        _ => return,
    };

    let Some(message) = ctx.callback_query().and_then(|q| q.message.as_ref()) else {
        return;
    };
    let params = EditMessageTextParams {
        chat_id: Some(ChatId::Id(message.chat.id)),
        message_id: Some(message.id),
        text: text.into(),
        reply_markup: Some(menu_keyboard()),
        ..Default::default()
    };

    // Editing does not answer the callback; auto_answer_callback_query does.
    if let Err(err) = ctx.edit_message_text(&params) {
        ctx.error(err);
    }
}

fn close(ctx: &mut Context) {
    if let Err(err) = ctx.delete_message_from_callback() {
        ctx.error(err);
    }
}

fn build_router() -> Result<Router> {
    let mut router = Router::new().with_client(Arc::new(LoggingApi::default()));

    router.use_middleware([recover(), auto_answer_callback_query()]);

    router
        .text("/start", [handler(start)])?
        .describe(LanguageCode::ALL, CommandScope::Default, "Show the menu")
        .describe(LanguageCode::UK, CommandScope::Default, "Показати меню");
    router
        .text("/echo", [handler(echo)])?
        .describe(LanguageCode::ALL, CommandScope::AllPrivateChats, "Echo text back");

    router.callback("menu", [handler(menu)])?;
    router.callback("close", [handler(close)])?;

    router.custom(
        |update: &Update| update.has_other("my_chat_member"),
        [handler(|ctx| {
            info!(update_id = ctx.update().update_id, "Membership changed");
            ctx.accept();
        })],
    );

    Ok(router)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    if let Some(port) = args.port {
        config.webhook.port = port;
    }
    config.router.debug |= args.debug;

    init_from_config(&config.logging);

    let router = config.router.apply(build_router()?);
    if let Err(err) = router.update_commands_description() {
        warn!(error = %err, "Failed to publish command descriptions");
    }

    serve(Arc::new(router), &config.webhook, shutdown_token()).await?;
    Ok(())
}
