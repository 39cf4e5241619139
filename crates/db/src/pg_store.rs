//! [`ContentStore`] backed by the `page_contents` table.

use async_trait::async_trait;
use serde_json::Value;
use vowpage_core::store::{CasOutcome, ContentStore, StoreError, StoredRecord};
use vowpage_core::types::{Version, INITIAL_VERSION};

use crate::repositories::PageContentRepo;
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: DbPool,
}

impl PgContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(err.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn load(&self, slug: &str) -> Result<Option<StoredRecord>, StoreError> {
        let row = PageContentRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(store_error)?;
        Ok(row.map(StoredRecord::from))
    }

    async fn compare_and_swap(
        &self,
        slug: &str,
        expected: Version,
        content: Value,
    ) -> Result<CasOutcome, StoreError> {
        let committed = if expected == INITIAL_VERSION {
            PageContentRepo::insert_or_advance_initial(&self.pool, slug, &content).await
        } else {
            PageContentRepo::update_if_version(&self.pool, slug, expected, &content).await
        }
        .map_err(store_error)?;

        match committed {
            Some(version) => Ok(CasOutcome::Committed { version }),
            None => {
                let current = PageContentRepo::current_version(&self.pool, slug)
                    .await
                    .map_err(store_error)?;
                tracing::debug!(slug = %slug, expected, current, "Conditional write matched no row");
                Ok(CasOutcome::Conflict { current })
            }
        }
    }
}
