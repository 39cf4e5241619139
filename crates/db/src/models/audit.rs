//! Audit log rows. Audit logs have no `updated_at` (immutable records).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowpage_core::audit::AuditEntry;
use vowpage_core::types::{DbId, Timestamp};

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub action_type: String,
    pub target: String,
    pub target_id: Option<String>,
    pub details_json: Option<serde_json::Value>,
    pub user_id: Option<DbId>,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditLog {
    pub action_type: String,
    pub target: String,
    pub target_id: Option<String>,
    pub details_json: Option<serde_json::Value>,
    pub user_id: Option<DbId>,
    pub occurred_at: Timestamp,
}

impl From<AuditEntry> for CreateAuditLog {
    fn from(entry: AuditEntry) -> Self {
        Self {
            action_type: entry.action,
            target: entry.target,
            target_id: entry.target_id,
            details_json: entry.detail,
            user_id: entry.actor_user_id,
            occurred_at: entry.at,
        }
    }
}
