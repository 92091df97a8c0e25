//! Application performance monitoring agent.
//!
//! # Responsibilities
//! - Validate agent configuration (app name, license key)
//! - Hand out per-request [`Transaction`] guards
//! - Buffer finished transactions in a bounded reservoir
//! - Periodically harvest buffered events to a [`Reporter`]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::MonitoringConfig;

use super::reporter::{HarvestBatch, LogReporter, Reporter};
use super::transaction::{Transaction, TransactionEvent};

/// Required license key length.
pub const LICENSE_KEY_LEN: usize = 40;

/// Errors raised by the monitoring agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApmError {
    #[error("application name is required")]
    MissingAppName,

    #[error("license length is not 40 (got {0})")]
    LicenseLength(usize),

    #[error("harvest interval must be greater than zero")]
    HarvestInterval,

    #[error("max samples stored must be greater than zero")]
    MaxSamples,

    #[error("attribute key {key:?}... is {len} bytes, limit is 255")]
    AttributeKeyTooLong { key: String, len: usize },

    #[error("attribute {key:?} has a non-finite float value")]
    InvalidAttributeValue { key: String },

    #[error("attribute limit of {limit} reached")]
    TooManyAttributes { limit: usize },

    #[error("transaction has already ended")]
    TransactionEnded,
}

/// Fixed-capacity reservoir sample of transaction events.
#[derive(Debug)]
struct EventReservoir {
    capacity: usize,
    seen: usize,
    events: Vec<TransactionEvent>,
}

impl EventReservoir {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            events: Vec::new(),
        }
    }

    fn add(&mut self, event: TransactionEvent) {
        self.seen += 1;
        if self.events.len() < self.capacity {
            self.events.push(event);
            return;
        }
        let slot = fastrand::usize(..self.seen);
        if slot < self.capacity {
            self.events[slot] = event;
        }
    }

    fn drain(&mut self) -> HarvestBatch {
        let batch = HarvestBatch {
            events: std::mem::take(&mut self.events),
            seen: self.seen,
        };
        self.seen = 0;
        batch
    }
}

/// A connected monitoring agent.
pub struct Application {
    config: MonitoringConfig,
    reporter: Arc<dyn Reporter>,
    reservoir: Mutex<EventReservoir>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("app_name", &self.config.app_name)
            .field("distributed_tracing", &self.config.distributed_tracing)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Create an agent that logs harvested events to stdout.
    pub fn new(config: &MonitoringConfig) -> Result<Self, ApmError> {
        Self::with_reporter(config, Arc::new(LogReporter))
    }

    /// Create an agent that harvests into `reporter`.
    pub fn with_reporter(
        config: &MonitoringConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, ApmError> {
        if config.app_name.trim().is_empty() {
            return Err(ApmError::MissingAppName);
        }
        let license_len = config.license_key.chars().count();
        if license_len != LICENSE_KEY_LEN {
            return Err(ApmError::LicenseLength(license_len));
        }
        if config.harvest_interval_secs == 0 {
            return Err(ApmError::HarvestInterval);
        }
        if config.max_samples_stored == 0 {
            return Err(ApmError::MaxSamples);
        }

        Ok(Self {
            config: config.clone(),
            reporter,
            reservoir: Mutex::new(EventReservoir::new(config.max_samples_stored)),
        })
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Begin a named transaction. It ends when the guard is dropped.
    pub fn start_transaction(&self, name: &str) -> Transaction<'_> {
        Transaction::start(self, name)
    }

    pub(crate) fn record(&self, event: TransactionEvent) {
        self.reservoir
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .add(event);
    }

    /// Flush buffered events to the reporter. Returns how many were sent.
    pub fn harvest(&self) -> usize {
        let batch = self
            .reservoir
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain();

        if batch.seen == 0 {
            return 0;
        }

        let sent = batch.events.len();
        self.reporter.report(batch);
        sent
    }

    /// Harvest every `harvest_interval_secs` until shutdown, then once more.
    pub fn spawn_harvester(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let period = Duration::from_secs(self.config.harvest_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let sent = self.harvest();
                        tracing::debug!(sent, "Harvest cycle complete");
                    }
                    _ = shutdown.recv() => {
                        let sent = self.harvest();
                        tracing::info!(sent, "Final harvest complete");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::reporter::MemoryReporter;

    const LICENSE: &str = "0123456789012345678901234567890123456789";

    fn config() -> MonitoringConfig {
        MonitoringConfig {
            license_key: LICENSE.into(),
            ..MonitoringConfig::default()
        }
    }

    #[test]
    fn empty_license_fails() {
        let err = Application::new(&MonitoringConfig::default()).unwrap_err();
        assert_eq!(err, ApmError::LicenseLength(0));
        assert_eq!(err.to_string(), "license length is not 40 (got 0)");
    }

    #[test]
    fn short_license_fails() {
        let config = MonitoringConfig {
            license_key: "abc".into(),
            ..MonitoringConfig::default()
        };
        assert_eq!(
            Application::new(&config).unwrap_err(),
            ApmError::LicenseLength(3)
        );
    }

    #[test]
    fn missing_app_name_fails() {
        let config = MonitoringConfig {
            app_name: "  ".into(),
            ..config()
        };
        assert_eq!(
            Application::new(&config).unwrap_err(),
            ApmError::MissingAppName
        );
    }

    #[test]
    fn zero_harvest_interval_fails() {
        let config = MonitoringConfig {
            harvest_interval_secs: 0,
            ..config()
        };
        let reporter = Arc::new(MemoryReporter::default());
        assert_eq!(
            Application::with_reporter(&config, reporter).unwrap_err(),
            ApmError::HarvestInterval
        );
    }

    #[test]
    fn zero_max_samples_fails() {
        let config = MonitoringConfig {
            max_samples_stored: 0,
            ..config()
        };
        assert_eq!(
            Application::new(&config).unwrap_err(),
            ApmError::MaxSamples
        );
    }

    #[test]
    fn valid_config_connects() {
        let app = Application::new(&config()).unwrap();
        assert_eq!(app.config().app_name, "ts-news-service");
    }

    #[test]
    fn harvest_drains_buffer() {
        let reporter = Arc::new(MemoryReporter::default());
        let app = Application::with_reporter(&config(), reporter.clone()).unwrap();

        assert_eq!(app.harvest(), 0);
        drop(app.start_transaction("a"));
        drop(app.start_transaction("b"));
        assert_eq!(app.harvest(), 2);
        assert_eq!(app.harvest(), 0);
        assert_eq!(reporter.events().len(), 2);
    }

    #[test]
    fn reservoir_caps_stored_events() {
        let reporter = Arc::new(MemoryReporter::default());
        let config = MonitoringConfig {
            max_samples_stored: 5,
            ..config()
        };
        let app = Application::with_reporter(&config, reporter.clone()).unwrap();

        for i in 0..50 {
            drop(app.start_transaction(&format!("t{i}")));
        }
        assert_eq!(app.harvest(), 5);
        assert_eq!(reporter.seen(), 50);
    }

    #[tokio::test]
    async fn harvester_flushes_on_shutdown() {
        let reporter = Arc::new(MemoryReporter::default());
        let app = Arc::new(Application::with_reporter(&config(), reporter.clone()).unwrap());
        let (tx, rx) = broadcast::channel(1);

        let handle = app.clone().spawn_harvester(rx);
        drop(app.start_transaction("GET /news"));
        tx.send(()).unwrap();
        handle.await.unwrap();

        assert_eq!(reporter.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn harvester_runs_on_interval() {
        let reporter = Arc::new(MemoryReporter::default());
        let app = Arc::new(Application::with_reporter(&config(), reporter.clone()).unwrap());
        let (tx, rx) = broadcast::channel(1);

        let handle = app.clone().spawn_harvester(rx);
        drop(app.start_transaction("GET /news"));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(reporter.events().len(), 1);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
