//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, LogOutput, LoggingConfig, RouterConfig, WebhookConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_webhook_config(&config.webhook)?;
    validate_router_config(&config.router)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter target must not be blank: {target:?}"
        )));
    }

    Ok(())
}

fn validate_webhook_config(webhook: &WebhookConfig) -> ConfigResult<()> {
    if webhook.host.is_empty() {
        return Err(ConfigError::missing_field("webhook.host"));
    }

    if webhook.port == 0 {
        return Err(ConfigError::InvalidPort(webhook.port));
    }

    if !webhook.path.starts_with('/') {
        return Err(ConfigError::validation(format!(
            "Webhook path must start with '/': {}",
            webhook.path
        )));
    }

    if webhook.secret.as_deref().is_some_and(str::is_empty) {
        return Err(ConfigError::validation(
            "Webhook secret must not be empty when set",
        ));
    }

    Ok(())
}

fn validate_router_config(router: &RouterConfig) -> ConfigResult<()> {
    if router.buffer_capacity == 0 {
        return Err(ConfigError::validation(
            "Buffer capacity must be greater than 0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_webhook() {
        let mut config = CourierConfig::default();
        config.webhook.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));

        let mut config = CourierConfig::default();
        config.webhook.path = "webhook".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut config = CourierConfig::default();
        config.webhook.secret = Some(String::new());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = CourierConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some(PathBuf::from("courier.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_buffer_capacity() {
        let mut config = CourierConfig::default();
        config.router.buffer_capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
