//! HTTP webhook entry point.
//!
//! The platform POSTs one JSON update per request. The response status
//! tells it whether the update was handled:
//!
//! | Outcome                              | Status |
//! |--------------------------------------|--------|
//! | accepted                             | 200    |
//! | not accepted                         | 404    |
//! | body is not an update                | 400    |
//! | secret token missing or wrong        | 401    |
//! | panic escaped the chain              | 500    |
//!
//! Handler errors are logged and never leak into the response body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use courier_core::Update;
use courier_router::{ContextOption, DispatchOutcome, Router, with_cancellation, with_raw};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::WebhookConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Header carrying the secret configured with `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    router: Arc<Router>,
    secret: Option<Arc<str>>,
}

/// Builds an axum router with a single POST route at `config.path`.
pub fn webhook_router(router: Arc<Router>, config: &WebhookConfig) -> axum::Router {
    let state = WebhookState {
        router,
        secret: config.secret.as_deref().map(Arc::from),
    };

    axum::Router::new()
        .route(&config.path, post(webhook_handler))
        .with_state(state)
}

/// Serves the webhook on `config.bind_addr()` until `shutdown` is cancelled.
pub async fn serve(
    router: Arc<Router>,
    config: &WebhookConfig,
    shutdown: CancellationToken,
) -> RuntimeResult<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| RuntimeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, path = %config.path, "Webhook listening");

    axum::serve(listener, webhook_router(router, config))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn webhook_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = &state.secret {
        let authorized = headers
            .get(SECRET_TOKEN_HEADER)
            .is_some_and(|v| constant_time_eq(v.as_bytes(), secret.as_bytes()));
        if !authorized {
            warn!("Rejected webhook request with a missing or wrong secret token");
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Malformed update body");
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };
    trace!(update_id = update.update_id, len = body.len(), "Received update");

    // Cancelled when this future is dropped, e.g. on client disconnect.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let router = Arc::clone(&state.router);
    let task = tokio::task::spawn_blocking(move || {
        let mut options: Vec<ContextOption> = vec![with_cancellation(cancel)];
        if router.is_debug() {
            let mut raw = router.acquire_buffer();
            raw.extend_from_slice(&body);
            options.push(with_raw(raw));
        }
        router.handle_with(update, options)
    });

    match task.await {
        Ok(outcome) => respond(outcome),
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn respond(outcome: DispatchOutcome) -> Response {
    for err in &outcome.errors {
        error!(error = %err, pattern = %outcome.pattern, "Handler error");
    }

    if outcome.is_faulted() {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
    } else if outcome.accepted {
        debug!(pattern = %outcome.pattern, "Update accepted");
        (StatusCode::OK, "ok").into_response()
    } else {
        debug!(pattern = %outcome.pattern, "Update not accepted");
        (StatusCode::NOT_FOUND, "not found").into_response()
    }
}
