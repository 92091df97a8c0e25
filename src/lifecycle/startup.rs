//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the monitoring agent (failure degrades, never aborts)
//! - Build the HTTP server and bind the listener
//! - Start background tasks (harvester, signal listener)
//!
//! Order: monitoring → server → listener → serve. Any listener error is fatal.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{ListenerConfig, MonitoringConfig, ServiceConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::Application;

/// Connect the APM agent, or log why not and continue unobserved.
pub fn init_monitoring(config: &MonitoringConfig) -> Option<Arc<Application>> {
    match Application::new(config) {
        Ok(app) => {
            tracing::info!(
                app_name = %config.app_name,
                distributed_tracing = config.distributed_tracing,
                "Monitoring agent initialized successfully"
            );
            Some(Arc::new(app))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to initialize monitoring agent, continuing without it"
            );
            None
        }
    }
}

/// Bind the configured listener address.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        address = %config.bind_address,
        "Listener bound"
    );

    Ok(listener)
}

/// Run the service until a termination signal arrives.
pub async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    let monitor = init_monitoring(&config.monitoring);
    let server = HttpServer::new(config, monitor.clone())?;
    let listener = bind_listener(&server.config().listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let harvester = monitor.map(|app| app.spawn_harvester(shutdown.subscribe()));
    spawn_signal_listener(shutdown.clone());

    let result = server.run(listener, server_shutdown).await;
    teardown(&shutdown, harvester, result).await
}

/// Stop background tasks once the server has returned, for any reason.
pub async fn teardown(
    shutdown: &Shutdown,
    harvester: Option<JoinHandle<()>>,
    result: Result<(), ServerError>,
) -> Result<(), ServerError> {
    shutdown.trigger();
    tracing::debug!(
        subscribers = shutdown.receiver_count(),
        "Shutdown broadcast sent"
    );

    if let Some(harvester) = harvester {
        if let Err(e) = harvester.await {
            tracing::warn!(error = %e, "Harvester task failed");
        }
    }

    result
}
