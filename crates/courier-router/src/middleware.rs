//! Stock middlewares.
//!
//! Each middleware wraps the rest of the chain by calling
//! [`Context::next`](crate::Context::next) inside its own body.

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use courier_core::AnswerCallbackQueryParams;
use tracing::{debug, error};

use crate::error::DispatchError;
use crate::handler::{Handler, handler};

/// Converts a panic in the rest of the chain into a [`DispatchError::Panic`].
///
/// The dispatch continues normally afterwards: the outcome is not faulted.
pub fn recover() -> Handler {
    handler(|ctx| {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| ctx.next())) {
            let err = DispatchError::from_panic(payload.as_ref());
            error!(error = %err, pattern = ctx.pattern(), "Recovered from handler panic");
            ctx.error(err);
        }
    })
}

/// Accepts the update once the rest of the chain has run, even if it panics.
///
/// This is the default not-found handler: unhandled updates are acknowledged
/// so the platform stops redelivering them.
pub fn auto_accept() -> Handler {
    handler(|ctx| {
        let result = catch_unwind(AssertUnwindSafe(|| ctx.next()));
        ctx.accept();
        if let Err(payload) = result {
            resume_unwind(payload);
        }
    })
}

/// Answers a callback query nobody accepted once the rest of the chain has run.
///
/// Keeps the client's button spinner from hanging. Failures are recorded
/// on the context.
pub fn auto_answer_callback_query() -> Handler {
    handler(|ctx| {
        let result = catch_unwind(AssertUnwindSafe(|| ctx.next()));

        if !ctx.is_accepted()
            && let Some(callback_query_id) = ctx.callback_query().map(|q| q.id.clone())
        {
            debug!(callback_query_id, "Answering unaccepted callback query");
            let params = AnswerCallbackQueryParams {
                callback_query_id,
                ..Default::default()
            };
            if let Err(err) = ctx.answer_callback_query(&params) {
                ctx.error(err);
            }
        }

        if let Err(payload) = result {
            resume_unwind(payload);
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use courier_core::api::ANSWER_CALLBACK_QUERY;
    use courier_core::{BotApi, CallbackQuery, Update};
    use serde_json::json;

    use super::*;
    use crate::context::Context;
    use crate::test_support::RecordingApi;

    fn run(api: Option<&Arc<RecordingApi>>, update: Update, handlers: &[Handler]) -> Context {
        let mut ctx = Context::new();
        let client = api.map(|api| api.clone() as Arc<dyn BotApi>);
        ctx.prepare(client, Arc::new(update), "test");
        ctx.push_handlers(handlers);
        ctx.next();
        ctx
    }

    fn callback_update() -> Update {
        Update {
            callback_query: Some(CallbackQuery {
                id: "cb-9".into(),
                data: "noop".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn panicking() -> Handler {
        handler(|_| panic!("handler exploded"))
    }

    #[test]
    fn test_recover_converts_panic() {
        let ctx = run(None, Update::default(), &[recover(), panicking()]);

        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.errors()[0].is_panic());
        assert_eq!(ctx.errors()[0].to_string(), "handler panicked: handler exploded");
    }

    #[test]
    fn test_auto_accept_after_chain() {
        let ctx = run(None, Update::default(), &[auto_accept()]);
        assert!(ctx.is_accepted());
    }

    #[test]
    fn test_auto_accept_on_unwind() {
        let ctx = run(None, Update::default(), &[recover(), auto_accept(), panicking()]);
        assert!(ctx.is_accepted());
        assert!(ctx.errors()[0].is_panic());
    }

    #[test]
    fn test_auto_answer_unaccepted_callback() {
        let api = Arc::new(RecordingApi::new());
        let ctx = run(
            Some(&api),
            callback_update(),
            &[auto_answer_callback_query(), handler(|_| {})],
        );

        assert!(ctx.is_accepted());
        assert_eq!(
            api.calls(),
            vec![(ANSWER_CALLBACK_QUERY.to_string(), json!({"callback_query_id": "cb-9"}))]
        );
    }

    #[test]
    fn test_auto_answer_skips_accepted() {
        let api = Arc::new(RecordingApi::new());
        run(
            Some(&api),
            callback_update(),
            &[auto_answer_callback_query(), handler(|ctx| ctx.accept())],
        );
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_auto_answer_skips_other_updates() {
        let api = Arc::new(RecordingApi::new());
        let ctx = run(Some(&api), Update::default(), &[auto_answer_callback_query()]);
        assert!(api.calls().is_empty());
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn test_auto_answer_records_failure() {
        let api = Arc::new(RecordingApi::new());
        api.fail(ANSWER_CALLBACK_QUERY);
        let ctx = run(Some(&api), callback_update(), &[auto_answer_callback_query()]);

        assert!(!ctx.is_accepted());
        assert!(matches!(
            ctx.errors(),
            [DispatchError::Api { method: ANSWER_CALLBACK_QUERY, .. }]
        ));
    }

    #[test]
    fn test_auto_answer_without_client() {
        let ctx = run(None, callback_update(), &[auto_answer_callback_query()]);
        assert!(matches!(ctx.errors(), [DispatchError::ClientNotSet]));
    }
}
