//! ts-news-service
//!
//! Serves a fixed JSON array of news items on every path and method,
//! recording one APM transaction per request when a license key is present.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request         ┌──────────────────────────────────────────┐
//!     ───────────────────────┼─▶ listener ─▶ request id ─▶ trace layer  │
//!                            │                                │         │
//!                            │                                ▼         │
//!                            │                         news_handler     │
//!                            │                     (transaction guard)  │
//!                            │                                │         │
//!     Client Response        │                                ▼         │
//!     ◀──────────────────────┼──────────────── application/json payload │
//!                            │                                          │
//!                            │  APM agent: reservoir ─▶ harvester ─▶ stdout
//!                            └──────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use news_service::config::{load_config, ObservabilityConfig};
use news_service::lifecycle::startup;
use news_service::observability::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        "ts-news-service starting"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Service terminated");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
