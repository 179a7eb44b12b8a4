//! Handler and predicate types.

use std::sync::Arc;

use courier_core::Update;

use crate::context::Context;

/// A step of a handler chain.
///
/// Middlewares and terminal handlers share this type. A middleware calls
/// [`Context::next`] to run the rest of the chain inside its own body.
pub type Handler = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Classifies updates for the custom registry.
pub type UpdatePredicate = Box<dyn Fn(&Update) -> bool + Send + Sync>;

/// Wraps a closure or function into a [`Handler`].
///
/// ```rust
/// use courier_router::{Context, handler};
///
/// let start = handler(|ctx: &mut Context| ctx.accept());
/// ```
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}
