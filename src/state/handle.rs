use super::engine::{Monitor, MonitorError};
use crate::message::{BusEvent, Message};
use crate::payload::{Node, Status};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

/// Change notification broadcast to live subscribers
#[derive(Clone, Debug)]
pub enum MonitorUpdate {
    Message(Message),
    Status(Status),
    NodeDiscovered(Node),
    Reset { prefix: String },
}

/// Shared handle to the single [`Monitor`] of the process.
///
/// The monitor is only touched through short, non-async critical sections.
/// Every state change is broadcast after the lock is released.
#[derive(Clone)]
pub struct MonitorHandle {
    monitor: Arc<RwLock<Monitor>>,
    updates_tx: broadcast::Sender<MonitorUpdate>,
}

impl MonitorHandle {
    pub fn new(monitor: Monitor) -> Self {
        let (updates_tx, _) = broadcast::channel(1000);
        Self {
            monitor: Arc::new(RwLock::new(monitor)),
            updates_tx,
        }
    }

    /// Run a read-only closure against the monitor.
    pub fn read<R>(&self, f: impl FnOnce(&Monitor) -> R) -> R {
        let monitor = self.monitor.read().unwrap_or_else(PoisonError::into_inner);
        f(&monitor)
    }

    /// Run a mutating closure against the monitor.
    pub fn write<R>(&self, f: impl FnOnce(&mut Monitor) -> R) -> R {
        let mut monitor = self.monitor.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut monitor)
    }

    /// Ingest one bus event and notify subscribers.
    pub fn ingest(&self, event: BusEvent) -> Message {
        let ingested = self.write(|m| m.ingest(event));

        // Send errors only mean nobody is listening
        let _ = self
            .updates_tx
            .send(MonitorUpdate::Message(ingested.message.clone()));
        if let Some(status) = ingested.status {
            let _ = self.updates_tx.send(MonitorUpdate::Status(status));
        }
        if let Some(node) = ingested.node {
            let _ = self.updates_tx.send(MonitorUpdate::NodeDiscovered(node));
        }

        ingested.message
    }

    /// Switch runs and notify subscribers.
    pub fn change_prefix(&self, prefix: &str) -> Result<(), MonitorError> {
        self.write(|m| m.change_prefix(prefix))?;
        let _ = self.updates_tx.send(MonitorUpdate::Reset {
            prefix: prefix.to_string(),
        });
        Ok(())
    }

    /// Subscribe to monitor updates
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorUpdate> {
        self.updates_tx.subscribe()
    }

    /// Drain bus events into the monitor, in delivery order.
    ///
    /// Returns when the bus adapter drops its sender.
    pub async fn run_ingest(self, mut events: mpsc::Receiver<BusEvent>) {
        info!("Starting message ingestion");

        while let Some(event) = events.recv().await {
            self.ingest(event);
        }

        warn!("Bus event channel closed, ingestion stopped");
    }
}
