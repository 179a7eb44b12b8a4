//! Courier Runtime - hosting layer for Courier routers.
//!
//! This crate provides:
//! - Layered configuration (`config`): defaults, `courier.toml`, `COURIER_*` variables
//! - Logging setup on `tracing-subscriber` (`logging`)
//! - The HTTP webhook entry point (`webhook`, feature `http-server`)
//! - Ctrl+C handling (`signal`)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use courier_router::Router;
//! use courier_runtime::{ConfigLoader, logging, shutdown_token, webhook};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let mut router = config.router.apply(Router::new());
//!     router.text("/start", [courier_router::handler(|ctx| ctx.accept())])?;
//!
//!     webhook::serve(Arc::new(router), &config.webhook, shutdown_token()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod signal;
#[cfg(feature = "http-server")]
pub mod webhook;

pub use config::{
    ConfigLoader, CourierConfig, LoggingConfig, Profile, RouterConfig, WebhookConfig,
    validate_config,
};
pub use error::{ConfigError, ConfigResult, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use signal::{shutdown_signal, shutdown_token};
#[cfg(feature = "http-server")]
pub use webhook::{SECRET_TOKEN_HEADER, serve, webhook_router};
