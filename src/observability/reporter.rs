//! Harvest destinations for transaction events.

use std::sync::Mutex;

use super::transaction::TransactionEvent;

/// One harvest cycle's worth of events.
#[derive(Debug, Clone, Default)]
pub struct HarvestBatch {
    /// Events kept by the reservoir.
    pub events: Vec<TransactionEvent>,
    /// Events observed since the previous harvest, including those sampled out.
    pub seen: usize,
}

/// Receives harvested events.
pub trait Reporter: Send + Sync {
    fn report(&self, batch: HarvestBatch);
}

/// Writes every event as a JSON line through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, batch: HarvestBatch) {
        tracing::info!(
            stored = batch.events.len(),
            seen = batch.seen,
            "Harvesting transaction events"
        );

        for event in &batch.events {
            match serde_json::to_string(event) {
                Ok(json) => tracing::info!(target: "news_service::apm", event = %json),
                Err(e) => tracing::warn!(error = %e, name = %event.name, "Failed to encode event"),
            }
        }
    }
}

/// Keeps harvested events in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<TransactionEvent>>,
    seen: Mutex<usize>,
}

impl MemoryReporter {
    /// All events reported so far.
    pub fn events(&self) -> Vec<TransactionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Total `seen` across all batches.
    pub fn seen(&self) -> usize {
        *self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, batch: HarvestBatch) {
        *self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) += batch.seen;
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(batch.events);
    }
}
