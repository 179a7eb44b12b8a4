//! Configuration for the Courier runtime.
//!
//! Layered loading (defaults, files, `COURIER_*` environment variables)
//! and validation of the logging, webhook and router settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    CourierConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RouterConfig, SpanEventConfig,
    WebhookConfig,
};
pub use validation::validate_config;
