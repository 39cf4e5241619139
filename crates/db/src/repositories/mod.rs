//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod page_content_repo;

pub use audit_repo::AuditLogRepo;
pub use page_content_repo::PageContentRepo;
