//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, action_type, target, target_id, details_json, \
    user_id, occurred_at, created_at";

/// Column list for INSERT (excludes auto-generated `id` and `created_at`).
const INSERT_COLUMNS: &str = "\
    action_type, target, target_id, details_json, user_id, occurred_at";

const INSERT_ARITY: u32 = 6;

/// Provides insert and lookup operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let mut rows = Self::batch_insert(pool, std::slice::from_ref(entry)).await?;
        rows.pop().ok_or(sqlx::Error::RowNotFound)
    }

    /// Batch insert multiple audit log entries in a single statement.
    pub async fn batch_insert(
        pool: &PgPool,
        entries: &[CreateAuditLog],
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<String> = (0..entries.len() as u32)
            .map(|row| {
                let params: Vec<String> = (1..=INSERT_ARITY)
                    .map(|col| format!("${}", row * INSERT_ARITY + col))
                    .collect();
                format!("({})", params.join(", "))
            })
            .collect();
        let query = format!(
            "INSERT INTO audit_logs ({INSERT_COLUMNS}) VALUES {} RETURNING {COLUMNS}",
            rows.join(", ")
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query);
        for entry in entries {
            q = q
                .bind(&entry.action_type)
                .bind(&entry.target)
                .bind(&entry.target_id)
                .bind(&entry.details_json)
                .bind(entry.user_id)
                .bind(entry.occurred_at);
        }

        q.fetch_all(pool).await
    }

    /// Most recent entries for one target, newest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target: &str,
        target_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE target = $1 AND target_id = $2 \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(target)
            .bind(target_id)
            .bind(limit.clamp(1, 500))
            .fetch_all(pool)
            .await
    }
}
