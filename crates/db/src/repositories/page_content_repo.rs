//! Repository for the `page_contents` table.
//!
//! Writes are conditional on the stored version and return nothing when the
//! condition fails. Each conditional write is a single statement, so the
//! version check and the update cannot interleave with another writer.

use sqlx::PgPool;
use vowpage_core::types::{Version, INITIAL_VERSION};

use crate::models::page_content::PageContent;

/// Column list for the `page_contents` table.
const COLUMNS: &str = "slug, version, content, created_at, updated_at";

/// Provides data access for versioned page content.
pub struct PageContentRepo;

impl PageContentRepo {
    /// Find the record for a slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<PageContent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM page_contents WHERE slug = $1");
        sqlx::query_as::<_, PageContent>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// The stored version, or [`INITIAL_VERSION`] when no record exists.
    pub async fn current_version(pool: &PgPool, slug: &str) -> Result<Version, sqlx::Error> {
        let version = sqlx::query_scalar::<_, Version>("SELECT version FROM page_contents WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(version.unwrap_or(INITIAL_VERSION))
    }

    /// First write for a slug: create the record at version 2, or advance an
    /// existing record that is still at version 1.
    pub async fn insert_or_advance_initial(
        pool: &PgPool,
        slug: &str,
        content: &serde_json::Value,
    ) -> Result<Option<Version>, sqlx::Error> {
        sqlx::query_scalar::<_, Version>(
            "INSERT INTO page_contents (slug, version, content) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE \
                SET version = EXCLUDED.version, content = EXCLUDED.content, updated_at = now() \
                WHERE page_contents.version = $4 \
             RETURNING version",
        )
        .bind(slug)
        .bind(INITIAL_VERSION + 1)
        .bind(content)
        .bind(INITIAL_VERSION)
        .fetch_optional(pool)
        .await
    }

    /// Advance a record from `expected` to `expected + 1`.
    pub async fn update_if_version(
        pool: &PgPool,
        slug: &str,
        expected: Version,
        content: &serde_json::Value,
    ) -> Result<Option<Version>, sqlx::Error> {
        sqlx::query_scalar::<_, Version>(
            "UPDATE page_contents \
             SET version = version + 1, content = $3, updated_at = now() \
             WHERE slug = $1 AND version = $2 \
             RETURNING version",
        )
        .bind(slug)
        .bind(expected)
        .bind(content)
        .fetch_optional(pool)
        .await
    }
}
