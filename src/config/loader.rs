//! Configuration loading from the environment.

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the APM license key.
pub const LICENSE_KEY_ENV: &str = "NEW_RELIC_LICENSE_KEY";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the configuration from defaults and the process environment.
pub fn load_config() -> Result<ServiceConfig, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Build the configuration using `lookup` in place of the process environment.
pub fn load_config_from<F>(lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServiceConfig::default();

    if let Some(key) = lookup(LICENSE_KEY_ENV) {
        config.monitoring.license_key = key.trim().to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
