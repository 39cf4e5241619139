//! Storage seam for versioned page content.
//!
//! A store holds at most one record per slug and offers a single atomic
//! compare-and-swap. It knows nothing about the schema: content goes in and
//! comes out as raw JSON, and the repository normalizes on both sides.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Timestamp, Version, INITIAL_VERSION};

/// What a store holds for one slug.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub version: Version,
    pub content: Value,
    pub updated_at: Timestamp,
}

/// Result of a compare-and-swap attempt. A conflict is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Committed { version: Version },
    Conflict { current: Version },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing service could not be reached or failed the operation.
    /// No partial state change happened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backing service answered with data the store cannot interpret.
    #[error("Store returned corrupt data: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// The current record for `slug`, if one was ever written.
    async fn load(&self, slug: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Store `content` as version `expected + 1` if the current version of
    /// `slug` is `expected`. A slug with no record is at
    /// [`INITIAL_VERSION`]. The compare and the write are one atomic step.
    async fn compare_and_swap(
        &self,
        slug: &str,
        expected: Version,
        content: Value,
    ) -> Result<CasOutcome, StoreError>;
}

/// Version reported for a slug, whether or not a record exists.
pub fn current_version(record: Option<&StoredRecord>) -> Version {
    record.map_or(INITIAL_VERSION, |r| r.version)
}
