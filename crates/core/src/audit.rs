//! Audit logging constants, the entry type, and the sink the repository
//! reports accepted writes to.
//!
//! Auditing is a side channel. A sink must never block or fail the write
//! that produced the entry, which is why [`AuditSink::record`] is
//! synchronous and infallible.

use serde::Serialize;
use serde_json::Value;

use crate::diff::SectionChange;
use crate::types::{DbId, Timestamp, Version};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod action_types {
    pub const CONTENT_UPDATE: &str = "content_update";
}

/// Known audit targets.
pub mod targets {
    pub const PAGE_CONTENT: &str = "page_content";
}

// ---------------------------------------------------------------------------
// Entry and sink
// ---------------------------------------------------------------------------

/// One accepted mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub action: String,
    pub target: String,
    pub target_id: Option<String>,
    pub detail: Option<Value>,
    pub actor_user_id: Option<DbId>,
    pub at: Timestamp,
}

impl AuditEntry {
    /// Entry for a committed content write. The detail lists the top-level
    /// sections the write touched and is redacted before it is attached.
    pub fn content_update(
        slug: &str,
        version: Version,
        changes: &[SectionChange],
        actor_user_id: Option<DbId>,
    ) -> Self {
        let detail = serde_json::json!({
            "slug": slug,
            "version": version,
            "changedSections": changes,
        });
        Self {
            action: action_types::CONTENT_UPDATE.to_string(),
            target: targets::PAGE_CONTENT.to_string(),
            target_id: Some(slug.to_string()),
            detail: Some(redact_sensitive_fields(&detail)),
            actor_user_id,
            at: chrono::Utc::now(),
        }
    }
}

/// Receives audit entries after the write they describe has committed.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Discards every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _entry: AuditEntry) {}
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields that should be redacted from audit log details before storage.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "authorization",
    "credential",
    "account_number",
];

/// Replace the value of any key matching [`SENSITIVE_FIELDS`] (case
/// insensitive substring) with `"[REDACTED]"`, recursively.
pub fn redact_sensitive_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_fields).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
