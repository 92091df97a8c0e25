//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace layer)
//!     → handler.rs (transaction guard, static JSON body)
//!     → Send to client
//! ```

pub mod handler;
pub mod server;

pub use handler::news_handler;
pub use server::{AppState, HttpServer, ServerError};
