//! News Service Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod news;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
