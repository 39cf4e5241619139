//! Durable audit persistence service.
//!
//! [`AuditPersistence`] subscribes to the [`AuditBus`](crate::bus::AuditBus)
//! and writes every received entry to the `audit_logs` table. It runs as a
//! long-lived background task and stops when the bus is dropped. A failed
//! insert is logged and skipped; it never reaches the write that produced
//! the entry.

use tokio::sync::broadcast;
use vowpage_core::audit::AuditEntry;
use vowpage_core::types::DbId;
use vowpage_db::models::audit::CreateAuditLog;
use vowpage_db::repositories::AuditLogRepo;
use vowpage_db::DbPool;

/// Background service that persists audit entries to the database.
pub struct AuditPersistence;

impl AuditPersistence {
    /// Run the persistence loop until the channel is closed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<AuditEntry>) {
        loop {
            match receiver.recv().await {
                Ok(entry) => {
                    if let Err(e) = Self::persist(&pool, entry.clone()).await {
                        tracing::error!(
                            error = %e,
                            action = %entry.action,
                            target_id = ?entry.target_id,
                            "Failed to persist audit entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Audit persistence lagged, some entries were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Audit bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, entry: AuditEntry) -> Result<DbId, sqlx::Error> {
        let row = AuditLogRepo::insert(pool, &CreateAuditLog::from(entry)).await?;
        Ok(row.id)
    }
}
