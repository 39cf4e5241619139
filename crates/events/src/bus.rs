//! In-process audit bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`AuditBus`] is shared via `Arc<AuditBus>` between the repository (as
//! its audit sink) and any number of subscribers.

use tokio::sync::broadcast;
use vowpage_core::audit::{AuditEntry, AuditSink};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`AuditEntry`]s.
pub struct AuditBus {
    sender: broadcast::Sender<AuditEntry>,
}

impl AuditBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed entries are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an entry to all current subscribers.
    ///
    /// With no subscribers the entry is dropped.
    pub fn publish(&self, entry: AuditEntry) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEntry> {
        self.sender.subscribe()
    }
}

impl Default for AuditBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AuditSink for AuditBus {
    fn record(&self, entry: AuditEntry) {
        tracing::debug!(action = %entry.action, target_id = ?entry.target_id, "Audit entry published");
        self.publish(entry);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
