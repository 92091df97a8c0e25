//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (stdout)
//! - Honour `RUST_LOG`, falling back to the configured level
//! - Pick pretty or JSON output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default filter directives for a log level.
pub fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("news_service={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_service_and_http_layer() {
        assert_eq!(
            default_directives("DEBUG"),
            "news_service=debug,tower_http=debug"
        );
    }

    #[test]
    fn directives_parse_as_filter() {
        assert!(EnvFilter::try_new(default_directives("info")).is_ok());
    }
}
