//! Configuration schema definitions.
//!
//! All types derive Serde traits and carry defaults, so the service runs
//! with no configuration input beyond the monitoring license key.

use serde::{Deserialize, Serialize};

/// Root configuration for the news service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// APM agent settings.
    pub monitoring: MonitoringConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:12862").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:12862".to_string(),
        }
    }
}

/// APM agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Application name reported with every transaction.
    pub app_name: String,

    /// License key; filled from `NEW_RELIC_LICENSE_KEY`.
    #[serde(skip_serializing)]
    pub license_key: String,

    /// Join inbound W3C trace context.
    pub distributed_tracing: bool,

    /// Seconds between event harvests.
    pub harvest_interval_secs: u64,

    /// Transaction events kept between harvests.
    pub max_samples_stored: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            app_name: "ts-news-service".to_string(),
            license_key: String::new(),
            distributed_tracing: true,
            harvest_interval_secs: 60,
            max_samples_stored: 10_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for the fmt layer.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
