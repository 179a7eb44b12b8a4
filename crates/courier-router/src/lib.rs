//! # Courier Router
//!
//! Routes chat-platform updates to handler chains.
//!
//! - **Registries**: per-channel pattern lists and a predicate list ([`CommandList`], [`CustomCommandList`])
//! - **Context**: the per-update chain state machine ([`Context`])
//! - **Middlewares**: [`recover`], [`auto_accept`], [`auto_answer_callback_query`]
//! - **Router**: resolution, pooling and dispatch ([`Router`])
//!
//! ```rust
//! use courier_router::{Context, Router, handler, middleware};
//! use courier_core::{CallbackQuery, Update};
//!
//! fn menu(ctx: &mut Context) {
//!     let page = ctx.query().and_then(|q| q.get("page").map(str::to_owned));
//!     if page.as_deref() == Some("help") {
//!         ctx.accept();
//!     }
//! }
//!
//! let mut router = Router::new();
//! router.use_middleware([middleware::recover()]);
//! router.callback("menu", [handler(menu)]).unwrap();
//!
//! let outcome = router.handle(Update {
//!     callback_query: Some(CallbackQuery { data: "menu page=help".into(), ..Default::default() }),
//!     ..Default::default()
//! });
//! assert!(outcome.accepted);
//! ```

pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod pool;
pub mod registry;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{ABORT_INDEX, Context, ContextOption, with_cancellation, with_raw};
pub use error::{BoxError, DispatchError, DispatchResult};
pub use handler::{Handler, UpdatePredicate, handler};
pub use middleware::{auto_accept, auto_answer_callback_query, recover};
pub use pool::{Pool, Pooled, Recycle};
pub use registry::{CommandList, CustomCommandList, Resolved};
pub use router::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_IDLE_CONTEXTS, DispatchOutcome, Router, TextRoute,
    UNMATCHED_PATTERN,
};
