//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use news_service::config::{MonitoringConfig, ServiceConfig};
use news_service::http::HttpServer;
use news_service::lifecycle::Shutdown;
use news_service::observability::{Application, MemoryReporter};
use tokio::net::TcpListener;

pub const EXPECTED_BODY: &str = r#"[
    {"Title": "News Service Complete", "Content": "Congratulations:Your News Service Complete"},
    {"Title": "Total Ticket System Complete", "Content": "Just a total test"}
]"#;

#[allow(dead_code)]
pub fn expected_json() -> serde_json::Value {
    serde_json::from_str(EXPECTED_BODY).unwrap()
}

/// A monitoring agent that keeps harvested events in memory.
#[allow(dead_code)]
pub fn monitored_app() -> (Arc<Application>, Arc<MemoryReporter>) {
    let config = MonitoringConfig {
        license_key: "0123456789abcdef0123456789abcdef01234567".into(),
        ..MonitoringConfig::default()
    };
    let reporter = Arc::new(MemoryReporter::default());
    let app = Application::with_reporter(&config, reporter.clone()).unwrap();
    (Arc::new(app), reporter)
}

/// Router for in-process requests.
#[allow(dead_code)]
pub fn router(monitor: Option<Arc<Application>>) -> Router {
    HttpServer::new(ServiceConfig::default(), monitor)
        .unwrap()
        .router()
}

/// Start the service on an ephemeral port.
#[allow(dead_code)]
pub async fn start_service(monitor: Option<Arc<Application>>) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(ServiceConfig::default(), monitor).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
