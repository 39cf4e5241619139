//! In-process [`ContentStore`] used by tests and by the server when no
//! database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::{current_version, CasOutcome, ContentStore, StoreError, StoredRecord};
use crate::types::Version;

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the compare-and-swap. Lets tests
    /// start a slug at an arbitrary version or with content that no longer
    /// normalizes.
    pub async fn seed(&self, slug: &str, version: Version, content: Value) {
        self.records.write().await.insert(
            slug.to_string(),
            StoredRecord {
                version,
                content,
                updated_at: chrono::Utc::now(),
            },
        );
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn load(&self, slug: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.records.read().await.get(slug).cloned())
    }

    async fn compare_and_swap(
        &self,
        slug: &str,
        expected: Version,
        content: Value,
    ) -> Result<CasOutcome, StoreError> {
        let mut records = self.records.write().await;
        let current = current_version(records.get(slug));
        if current != expected {
            return Ok(CasOutcome::Conflict { current });
        }

        let version = current + 1;
        records.insert(
            slug.to_string(),
            StoredRecord {
                version,
                content,
                updated_at: chrono::Utc::now(),
            },
        );
        Ok(CasOutcome::Committed { version })
    }
}
