//! In-process audit fan-out and its durable persistence.
//!
//! - [`AuditBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`,
//!   plugged into the repository as its [`AuditSink`](vowpage_core::audit::AuditSink).
//! - [`AuditPersistence`]: background service that writes every published
//!   entry to the `audit_logs` table.

pub mod bus;
pub mod persistence;

pub use bus::AuditBus;
pub use persistence::AuditPersistence;
