//! Per-dispatch execution context.
//!
//! A [`Context`] carries one update through its handler chain. It implements
//! the chain protocol:
//!
//! ```text
//!   idle ──acquire──▶ running ──cursor ≥ len──▶ finished
//!  (cursor -1)           │
//!                        └──abort──▶ aborted (cursor = ABORT_INDEX)
//! ```
//!
//! - [`Context::next`] runs the remaining handlers inside the caller, so a
//!   middleware can do work before and after the rest of the chain.
//! - [`Context::abort`] stops pending handlers without unwinding frames that
//!   are already running.
//! - [`Context::accept`] is sticky: once accepted, always accepted.
//! - [`Context::error`] records an error and lets the chain continue.
//!
//! Contexts are pooled by the router and recycled after every dispatch.

mod client;
mod respond;

use std::fmt;
use std::sync::{Arc, LazyLock};

use courier_core::{BotApi, CallbackQuery, Channel, InlineQuery, Message, Query, Update};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::DispatchError;
use crate::handler::Handler;
use crate::pool::{Pooled, Recycle};

/// Cursor value marking an aborted chain.
pub const ABORT_INDEX: isize = isize::MAX >> 1;

static EMPTY_UPDATE: LazyLock<Update> = LazyLock::new(Update::default);

/// A per-dispatch context tweak applied after the chain is assembled.
pub type ContextOption = Box<dyn FnOnce(&mut Context) + Send>;

/// Attaches the raw request body for debugging.
pub fn with_raw(raw: Pooled<Vec<u8>>) -> ContextOption {
    Box::new(move |ctx| ctx.raw = Some(raw))
}

/// Attaches a cancellation signal handlers may observe.
pub fn with_cancellation(token: CancellationToken) -> ContextOption {
    Box::new(move |ctx| ctx.cancel = Some(token))
}

/// State of one update travelling through its handler chain.
pub struct Context {
    client: Option<Arc<dyn BotApi>>,
    cancel: Option<CancellationToken>,
    update: Option<Arc<Update>>,
    pattern: String,
    raw: Option<Pooled<Vec<u8>>>,
    handlers: Vec<Handler>,
    errors: Vec<DispatchError>,
    index: isize,
    accepted: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            client: None,
            cancel: None,
            update: None,
            pattern: String::new(),
            raw: None,
            handlers: Vec::new(),
            errors: Vec::new(),
            index: -1,
            accepted: false,
        }
    }
}

impl Recycle for Context {
    fn recycle(&mut self) {
        self.client = None;
        self.cancel = None;
        self.update = None;
        self.pattern.clear();
        self.raw = None;
        self.handlers.clear();
        self.errors.clear();
        self.index = -1;
        self.accepted = false;
    }
}

impl Context {
    /// Creates an idle context.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Population (router side)
    // =========================================================================

    pub(crate) fn prepare(
        &mut self,
        client: Option<Arc<dyn BotApi>>,
        update: Arc<Update>,
        pattern: &str,
    ) {
        self.client = client;
        self.update = Some(update);
        self.pattern.push_str(pattern);
    }

    pub(crate) fn push_handlers<'a>(&mut self, handlers: impl IntoIterator<Item = &'a Handler>) {
        self.handlers.extend(handlers.into_iter().cloned());
    }

    pub(crate) fn take_errors(&mut self) -> Vec<DispatchError> {
        std::mem::take(&mut self.errors)
    }

    // =========================================================================
    // Chain protocol
    // =========================================================================

    /// Runs the pending handlers of the chain.
    ///
    /// Should only be called from inside a handler. Returns once the chain is
    /// exhausted or aborted.
    pub fn next(&mut self) {
        self.index += 1;

        while let Some(handler) = self.current_handler() {
            trace!(index = self.index, "Running handler");
            handler(self);
            self.index += 1;
        }
    }

    fn current_handler(&self) -> Option<Handler> {
        usize::try_from(self.index)
            .ok()
            .and_then(|index| self.handlers.get(index))
            .cloned()
    }

    /// Prevents pending handlers from running. The current handler continues.
    pub fn abort(&mut self) {
        self.index = ABORT_INDEX;
    }

    pub fn is_aborted(&self) -> bool {
        self.index >= ABORT_INDEX
    }

    /// Marks the update as handled. Cannot be undone.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Records an error. The chain keeps running.
    pub fn error(&mut self, err: impl Into<DispatchError>) {
        self.errors.push(err.into());
    }

    pub fn errors(&self) -> &[DispatchError] {
        &self.errors
    }

    /// Number of handlers in the assembled chain, middlewares included.
    pub fn chain_len(&self) -> usize {
        self.handlers.len()
    }

    // =========================================================================
    // Update accessors
    // =========================================================================

    /// The update being dispatched. Empty on an idle context.
    pub fn update(&self) -> &Update {
        self.update.as_deref().unwrap_or(&EMPTY_UPDATE)
    }

    pub fn message(&self) -> Option<&Message> {
        self.update().message.as_ref()
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.update().callback_query.as_ref()
    }

    pub fn inline_query(&self) -> Option<&InlineQuery> {
        self.update().inline_query.as_ref()
    }

    pub fn channel(&self) -> Channel {
        self.update().channel()
    }

    /// The dispatch text: message text, callback data or inline query.
    pub fn text(&self) -> Option<&str> {
        self.update().dispatch_text().map(|(_, text)| text)
    }

    /// The pattern that selected this chain, or `"?"` for a custom or
    /// fallback chain.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Decodes the dispatch text as a command query.
    ///
    /// Returns `None` for updates without dispatch text.
    pub fn query(&self) -> Option<Query> {
        self.text().map(Query::decode)
    }

    /// The raw request body, when the router runs in debug mode.
    pub fn raw_debug(&self) -> Option<&[u8]> {
        self.raw.as_deref().map(Vec::as_slice)
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Returns `true` once the transport gave up on this update.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("update_id", &self.update().update_id)
            .field("pattern", &self.pattern)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .field("accepted", &self.accepted)
            .field("errors", &self.errors)
            .field("has_client", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
