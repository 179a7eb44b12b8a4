//! The update router.
//!
//! # Dispatch
//!
//! ```text
//! Update ──▶ dispatch text? ──yes──▶ channel registry ──match──▶ chain
//!                 │                        │ no match
//!                 │ no                     ▼
//!                 └──────────────▶ custom predicates ──match──▶ chain (pattern "?")
//!                                          │ no match
//!                                          ▼
//!                                   not-found handler (pattern "?")
//! ```
//!
//! The chain actually run is the global middlewares followed by the resolved
//! handlers. It runs on the calling thread inside a pooled [`Context`]; a
//! panic escaping the chain is caught, recorded, and the context is still
//! returned to the pool.
//!
//! # Initialization
//!
//! Registration takes `&mut self` and dispatch takes `&self`. Register
//! everything first, then share the router (typically behind an `Arc`):
//! once shared, the registries can no longer change.
//!
//! ```rust
//! use courier_router::{Router, handler};
//! use courier_core::{Message, Update};
//!
//! let mut router = Router::new();
//! router
//!     .text("/start", [handler(|ctx| ctx.accept())])
//!     .unwrap();
//!
//! let outcome = router.handle(Update {
//!     message: Some(Message { text: "/start".into(), ..Default::default() }),
//!     ..Default::default()
//! });
//! assert!(outcome.accepted);
//! assert_eq!(outcome.pattern, "/start");
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use courier_core::api::SET_MY_COMMANDS;
use courier_core::{
    BotApi, BotApiExt, Channel, CommandDescriber, CommandDescription, CommandScope, LanguageCode,
    PatternError, SetMyCommandsParams, Update,
};
use tracing::{debug, debug_span, error};

use crate::context::{Context, ContextOption};
use crate::error::{DispatchError, DispatchResult};
use crate::handler::Handler;
use crate::middleware::auto_accept;
use crate::pool::{Pool, Pooled};
use crate::registry::{CommandList, CustomCommandList};

/// Initial capacity of debug capture buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;
/// Idle contexts (and buffers) kept for reuse.
pub const DEFAULT_MAX_IDLE_CONTEXTS: usize = 64;
/// Pattern reported for custom and not-found chains.
pub const UNMATCHED_PATTERN: &str = "?";

/// The result of dispatching one update.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// The update was meaningfully handled.
    pub accepted: bool,
    /// The pattern that selected the chain, or `"?"`.
    pub pattern: String,
    /// Errors recorded while the chain ran.
    pub errors: Vec<DispatchError>,
    /// A panic escaped the chain and was caught by the router.
    pub faulted: bool,
}

impl DispatchOutcome {
    /// Returns `true` if a panic escaped the chain.
    ///
    /// Panics recovered inside the chain (see [`recover`](crate::middleware::recover))
    /// only show up in `errors`.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Returns `true` if the chain recorded any error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A registered text command, returned by [`Router::text`] to attach
/// command menu descriptions.
pub struct TextRoute<'a> {
    pattern: String,
    describer: &'a mut CommandDescriber,
}

impl TextRoute<'_> {
    /// Describes the command for a language and scope.
    pub fn describe(
        self,
        language: LanguageCode,
        scope: CommandScope,
        description: impl Into<String>,
    ) -> Self {
        self.describer.add_command_description(
            &self.pattern,
            [CommandDescription {
                scope,
                language_code: language,
                description: description.into(),
            }],
        );
        self
    }

    /// The pattern as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Routes updates to handler chains.
pub struct Router {
    client: Option<Arc<dyn BotApi>>,
    debug: bool,
    middlewares: Vec<Handler>,
    texts: CommandList,
    callbacks: CommandList,
    inlines: CommandList,
    custom: CustomCommandList,
    describer: CommandDescriber,
    not_found: Handler,
    contexts: Pool<Context>,
    buffers: Pool<Vec<u8>>,
    buffer_capacity: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router without a client, with `auto_accept` as not-found handler.
    pub fn new() -> Self {
        Self {
            client: None,
            debug: false,
            middlewares: Vec::new(),
            texts: CommandList::new(),
            callbacks: CommandList::new(),
            inlines: CommandList::new(),
            custom: CustomCommandList::new(),
            describer: CommandDescriber::new(),
            not_found: auto_accept(),
            contexts: Pool::new(DEFAULT_MAX_IDLE_CONTEXTS, Context::new),
            buffers: buffer_pool(DEFAULT_MAX_IDLE_CONTEXTS, DEFAULT_BUFFER_CAPACITY),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Sets the platform client used by context calls.
    pub fn with_client(mut self, client: Arc<dyn BotApi>) -> Self {
        self.client = Some(client);
        self
    }

    /// Enables capture of raw request bodies.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the initial capacity of debug capture buffers.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self.buffers = buffer_pool(self.contexts.max_idle(), capacity);
        self
    }

    /// Sets how many idle contexts and buffers are kept for reuse.
    pub fn with_max_idle_contexts(mut self, max_idle: usize) -> Self {
        self.contexts = Pool::new(max_idle, Context::new);
        self.buffers = buffer_pool(max_idle, self.buffer_capacity);
        self
    }

    pub fn client(&self) -> Option<&Arc<dyn BotApi>> {
        self.client.as_ref()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Appends global middlewares, run before every chain.
    pub fn use_middleware(&mut self, middlewares: impl IntoIterator<Item = Handler>) -> &mut Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Registers a text message command.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] of an invalid pattern.
    pub fn text(
        &mut self,
        pattern: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<TextRoute<'_>, PatternError> {
        self.texts.add_handler(pattern, handlers)?;
        debug!(channel = %Channel::Text, pattern, "Registered command");
        Ok(TextRoute {
            pattern: pattern.to_string(),
            describer: &mut self.describer,
        })
    }

    /// Registers a callback query command.
    pub fn callback(
        &mut self,
        pattern: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<&mut Self, PatternError> {
        self.callbacks.add_handler(pattern, handlers)?;
        debug!(channel = %Channel::Callback, pattern, "Registered command");
        Ok(self)
    }

    /// Registers an inline query command.
    pub fn inline(
        &mut self,
        pattern: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<&mut Self, PatternError> {
        self.inlines.add_handler(pattern, handlers)?;
        debug!(channel = %Channel::Inline, pattern, "Registered command");
        Ok(self)
    }

    /// Registers a predicate-matched chain.
    pub fn custom<P>(&mut self, predicate: P, handlers: impl IntoIterator<Item = Handler>) -> &mut Self
    where
        P: Fn(&Update) -> bool + Send + Sync + 'static,
    {
        self.custom.add_handler(predicate, handlers);
        self
    }

    /// Sets the handler for unmatched updates. `None` restores `auto_accept`.
    pub fn not_found(&mut self, handler: Option<Handler>) -> &mut Self {
        self.not_found = handler.unwrap_or_else(auto_accept);
        self
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches an update.
    pub fn handle(&self, update: impl Into<Arc<Update>>) -> DispatchOutcome {
        self.handle_with(update, [])
    }

    /// Dispatches an update, applying `options` to the context before the
    /// chain starts.
    pub fn handle_with(
        &self,
        update: impl Into<Arc<Update>>,
        options: impl IntoIterator<Item = ContextOption>,
    ) -> DispatchOutcome {
        let update = update.into();
        let channel = update.channel();
        let span = debug_span!("dispatch", update_id = update.update_id, channel = %channel);
        let _enter = span.enter();

        let (handlers, pattern) = self.resolve(&update);
        debug!(pattern, handlers = handlers.len(), "Resolved chain");

        let mut ctx: Pooled<Context> = self.contexts.acquire();
        ctx.prepare(self.client.clone(), Arc::clone(&update), pattern);
        ctx.push_handlers(&self.middlewares);
        ctx.push_handlers(handlers);

        for option in options {
            option(&mut *ctx);
        }

        let faulted = match catch_unwind(AssertUnwindSafe(|| ctx.next())) {
            Ok(()) => false,
            Err(payload) => {
                let err = DispatchError::from_panic(payload.as_ref());
                error!(error = %err, pattern, "Handler chain panicked");
                ctx.error(err);
                true
            }
        };

        DispatchOutcome {
            accepted: ctx.is_accepted(),
            pattern: pattern.to_string(),
            errors: ctx.take_errors(),
            faulted,
        }
    }

    fn resolve<'a>(&'a self, update: &Update) -> (&'a [Handler], &'a str) {
        if let Some((channel, text)) = update.dispatch_text() {
            let list = match channel {
                Channel::Text => &self.texts,
                Channel::Callback => &self.callbacks,
                Channel::Inline => &self.inlines,
                Channel::Custom => return self.resolve_custom(update),
            };

            if let Some(resolved) = list.find_handler(text) {
                return (resolved.handlers, resolved.pattern);
            }
        }

        self.resolve_custom(update)
    }

    fn resolve_custom<'a>(&'a self, update: &Update) -> (&'a [Handler], &'a str) {
        let handlers = self
            .custom
            .find_handler(update)
            .unwrap_or(std::slice::from_ref(&self.not_found));
        (handlers, UNMATCHED_PATTERN)
    }

    /// Takes a scratch buffer for capturing a raw request body.
    pub fn acquire_buffer(&self) -> Pooled<Vec<u8>> {
        self.buffers.acquire()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// `setMyCommands` parameters for every described text command.
    pub fn list_commands_params(&self) -> Vec<SetMyCommandsParams> {
        self.describer.list_commands_params()
    }

    /// Sends every command description to the platform.
    ///
    /// Stops at the first failing call.
    pub fn update_commands_description(&self) -> DispatchResult<()> {
        let client = self.client.as_deref().ok_or(DispatchError::ClientNotSet)?;

        for params in self.list_commands_params() {
            client
                .set_my_commands(&params)
                .map_err(|source| DispatchError::Api {
                    method: SET_MY_COMMANDS,
                    source,
                })?;
            debug!(
                scope = ?params.scope,
                language = %params.language_code,
                commands = params.commands.len(),
                "Updated command descriptions"
            );
        }

        Ok(())
    }
}

fn buffer_pool(max_idle: usize, capacity: usize) -> Pool<Vec<u8>> {
    Pool::new(max_idle, move || Vec::with_capacity(capacity))
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("has_client", &self.client.is_some())
            .field("debug", &self.debug)
            .field("middlewares", &self.middlewares.len())
            .field("texts", &self.texts)
            .field("callbacks", &self.callbacks)
            .field("inlines", &self.inlines)
            .field("custom", &self.custom)
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}
