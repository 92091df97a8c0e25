//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → apm.rs (Application::start_transaction)
//!     → transaction.rs (attributes, request/response, trace context)
//!     → guard dropped → event into the reservoir
//!     → harvester → reporter.rs (stdout via tracing)
//!
//! Everything logs through logging.rs (tracing subscriber on stdout).
//! ```

pub mod apm;
pub mod logging;
pub mod reporter;
pub mod tracing;
pub mod transaction;

pub use apm::{ApmError, Application};
pub use reporter::{HarvestBatch, LogReporter, MemoryReporter, Reporter};
pub use transaction::{AttributeValue, Transaction, TransactionEvent};
