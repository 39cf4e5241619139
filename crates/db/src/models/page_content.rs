use serde::Serialize;
use sqlx::FromRow;
use vowpage_core::store::StoredRecord;
use vowpage_core::types::{Timestamp, Version};

/// A row of `page_contents`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageContent {
    pub slug: String,
    pub version: Version,
    pub content: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PageContent> for StoredRecord {
    fn from(row: PageContent) -> Self {
        StoredRecord {
            version: row.version,
            content: row.content,
            updated_at: row.updated_at,
        }
    }
}
