//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! schema.rs defaults
//!     → loader.rs (overlay NEW_RELIC_LICENSE_KEY)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_from, ConfigError, LICENSE_KEY_ENV};
pub use schema::{ListenerConfig, LogFormat, MonitoringConfig, ObservabilityConfig, ServiceConfig};
pub use validation::{validate_config, ValidationError};
