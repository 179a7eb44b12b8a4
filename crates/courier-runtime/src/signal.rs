//! Process signal helpers.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolves when the process receives Ctrl+C.
///
/// If the signal handler cannot be installed this never resolves.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Returns a token that is cancelled on Ctrl+C.
///
/// Must be called from within a Tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });
    token
}
