//! Versioned content repository: normalization on both sides of a
//! [`ContentStore`], optimistic concurrency, and the audit side effect.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::audit::{AuditEntry, AuditSink};
use crate::diff::changed_sections;
use crate::error::CoreError;
use crate::schema::{self, Document};
use crate::store::{current_version, CasOutcome, ContentStore};
use crate::types::{DbId, Version, INITIAL_VERSION};

/// Maximum slug length.
pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{1,64}$").expect("valid regex"));

/// Reject anything but 1-64 lowercase ASCII letters, digits, `_` or `-`.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!(
            "Slug must be 1-{MAX_SLUG_LEN} characters of a-z, 0-9, '_' or '-', got '{slug}'"
        )))
    }
}

/// A canonical document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionedContent {
    pub slug: String,
    pub version: Version,
    pub content: Document,
}

/// Who is performing a write. Only used for the audit trail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<DbId>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: DbId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Read and compare-and-swap access to page content, local or remote.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// The latest committed content for `slug`. Never fails for a slug that
    /// was never written; that slug reads as the fallback document at
    /// version 1.
    async fn read(&self, slug: &str) -> Result<VersionedContent, CoreError>;

    /// Commit `candidate` if `slug` is still at `expected_version`, returning
    /// the new version.
    ///
    /// Fails with [`CoreError::Validation`] before touching storage when the
    /// candidate does not normalize, and with [`CoreError::VersionConflict`]
    /// when another write got there first.
    async fn write(
        &self,
        slug: &str,
        expected_version: Version,
        candidate: &Value,
        actor: Actor,
    ) -> Result<Version, CoreError>;
}

/// [`ContentRepository`] over any [`ContentStore`].
#[derive(Clone)]
pub struct VersionedRepository {
    store: Arc<dyn ContentStore>,
    audit: Arc<dyn AuditSink>,
}

impl VersionedRepository {
    pub fn new(store: Arc<dyn ContentStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }
}

#[async_trait]
impl ContentRepository for VersionedRepository {
    async fn read(&self, slug: &str) -> Result<VersionedContent, CoreError> {
        validate_slug(slug)?;

        let Some(record) = self.store.load(slug).await? else {
            return Ok(VersionedContent {
                slug: slug.to_string(),
                version: INITIAL_VERSION,
                content: schema::fallback_document(),
            });
        };

        let content = match schema::normalize(&record.content) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(
                    slug = %slug,
                    version = record.version,
                    violations = error.violations.len(),
                    first = %error.summary(),
                    "Stored content failed normalization, serving fallback document",
                );
                schema::fallback_document()
            }
        };

        Ok(VersionedContent {
            slug: slug.to_string(),
            version: record.version,
            content,
        })
    }

    async fn write(
        &self,
        slug: &str,
        expected_version: Version,
        candidate: &Value,
        actor: Actor,
    ) -> Result<Version, CoreError> {
        validate_slug(slug)?;
        let normalized = schema::normalize(candidate)?.to_value();

        let previous = self.store.load(slug).await?;
        let current = current_version(previous.as_ref());
        if current != expected_version {
            tracing::info!(slug = %slug, expected_version, current, "Version conflict");
            return Err(CoreError::VersionConflict {
                latest_version: current,
            });
        }

        let version = match self
            .store
            .compare_and_swap(slug, expected_version, normalized.clone())
            .await?
        {
            CasOutcome::Committed { version } => version,
            CasOutcome::Conflict { current } => {
                tracing::info!(slug = %slug, expected_version, current, "Version conflict at commit");
                return Err(CoreError::VersionConflict {
                    latest_version: current,
                });
            }
        };

        let before = previous.map(|r| r.content).unwrap_or(Value::Null);
        let changes = changed_sections(&before, &normalized);
        tracing::info!(
            slug = %slug,
            version,
            changed_sections = changes.len(),
            "Content committed",
        );
        self.audit.record(AuditEntry::content_update(
            slug,
            version,
            &changes,
            actor.user_id,
        ));

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::audit::{action_types, NoopAuditSink};
    use crate::memory_store::MemoryContentStore;
    use crate::store::{StoreError, StoredRecord};

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<AuditEntry>>);

    impl AuditSink for RecordingSink {
        fn record(&self, entry: AuditEntry) {
            self.0.lock().unwrap().push(entry);
        }
    }

    /// Counts every call that reaches the store.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryContentStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn load(&self, slug: &str) -> Result<Option<StoredRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load(slug).await
        }

        async fn compare_and_swap(
            &self,
            slug: &str,
            expected: Version,
            content: Value,
        ) -> Result<CasOutcome, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.compare_and_swap(slug, expected, content).await
        }
    }

    struct DownStore;

    #[async_trait]
    impl ContentStore for DownStore {
        async fn load(&self, _slug: &str) -> Result<Option<StoredRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn compare_and_swap(
            &self,
            _slug: &str,
            _expected: Version,
            _content: Value,
        ) -> Result<CasOutcome, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    fn repo_with(store: Arc<dyn ContentStore>) -> VersionedRepository {
        VersionedRepository::new(store, Arc::new(NoopAuditSink))
    }

    fn repo() -> VersionedRepository {
        repo_with(Arc::new(MemoryContentStore::new()))
    }

    fn doc(groom: &str) -> Value {
        json!({"couple": {"groomName": groom, "brideName": "Seoyeon"}})
    }

    // -----------------------------------------------------------------------
    // read
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unwritten_slug_reads_fallback_at_version_one() {
        let read = repo().read("main").await.unwrap();
        assert_eq!(read.version, INITIAL_VERSION);
        assert_eq!(read.content, schema::fallback_document());
    }

    #[tokio::test]
    async fn corrupt_record_reads_fallback_but_keeps_version() {
        let store = Arc::new(MemoryContentStore::new());
        store.seed("main", 9, json!({"couple": "broken"})).await;

        let read = repo_with(store).read("main").await.unwrap();
        assert_eq!(read.version, 9);
        assert_eq!(read.content, schema::fallback_document());
    }

    #[tokio::test]
    async fn invalid_slug_is_rejected() {
        assert_matches!(repo().read("Main Page").await, Err(CoreError::InvalidInput(_)));
        assert_matches!(repo().read("").await, Err(CoreError::InvalidInput(_)));
        let long = "a".repeat(MAX_SLUG_LEN + 1);
        assert_matches!(repo().read(&long).await, Err(CoreError::InvalidInput(_)));
        assert!(validate_slug("spring-2026_main").is_ok());
    }

    // -----------------------------------------------------------------------
    // write
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn versions_increase_by_exactly_one() {
        let repo = repo();
        let mut expected = INITIAL_VERSION;
        for i in 0..5 {
            let version = repo
                .write("main", expected, &doc(&format!("G{i}")), Actor::anonymous())
                .await
                .unwrap();
            assert_eq!(version, expected + 1);
            expected = version;
        }
        assert_eq!(repo.read("main").await.unwrap().version, 6);
    }

    #[tokio::test]
    async fn written_content_reads_back_normalized() {
        let repo = repo();
        let candidate = json!({
            "couple": {"groomName": "Minjun", "brideName": "Seoyeon"},
            "transport": {"bus": ["간선버스: 101"]},
            "theme": "rose"
        });
        repo.write("main", 1, &candidate, Actor::anonymous()).await.unwrap();

        let read = repo.read("main").await.unwrap();
        assert_eq!(read.content, schema::normalize(&candidate).unwrap());
        assert_eq!(read.content.extra["theme"], "rose");
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let repo = repo();
        repo.write("main", 1, &doc("A"), Actor::anonymous()).await.unwrap();

        let err = repo.write("main", 1, &doc("B"), Actor::anonymous()).await.unwrap_err();
        assert_matches!(err, CoreError::VersionConflict { latest_version: 2 });
        assert_eq!(repo.read("main").await.unwrap().content.couple.groom_name, "A");
    }

    #[tokio::test]
    async fn concurrent_writers_exactly_one_wins() {
        let store = Arc::new(MemoryContentStore::new());
        store.seed("main", 3, doc("base")).await;
        let repo = repo_with(store);

        let a = doc("A");
        let b = doc("B");
        let (first, second) = tokio::join!(
            repo.write("main", 3, &a, Actor::anonymous()),
            repo.write("main", 3, &b, Actor::anonymous()),
        );

        let (winner, loser) = match (first, second) {
            (Ok(v), Err(e)) => (("A", v), e),
            (Err(e), Ok(v)) => (("B", v), e),
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        assert_eq!(winner.1, 4);
        assert_matches!(loser, CoreError::VersionConflict { latest_version: 4 });
        assert_eq!(repo.read("main").await.unwrap().content.couple.groom_name, winner.0);
    }

    #[tokio::test]
    async fn invalid_candidate_never_touches_storage() {
        let store = Arc::new(CountingStore::default());
        let repo = repo_with(store.clone());

        let err = repo
            .write("main", 1, &json!({"couple": {"groomName": 1}}), Actor::anonymous())
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e.violations.len() == 2);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn storage_failure_is_unavailable() {
        let repo = repo_with(Arc::new(DownStore));
        assert_matches!(repo.read("main").await, Err(CoreError::StorageUnavailable(_)));
        assert_matches!(
            repo.write("main", 1, &doc("A"), Actor::anonymous()).await,
            Err(CoreError::StorageUnavailable(_))
        );
    }

    // -----------------------------------------------------------------------
    // audit
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn committed_write_records_one_audit_entry() {
        let sink = Arc::new(RecordingSink::default());
        let repo = VersionedRepository::new(Arc::new(MemoryContentStore::new()), sink.clone());

        repo.write("main", 1, &doc("A"), Actor::user(42)).await.unwrap();
        let _ = repo.write("main", 1, &doc("B"), Actor::user(42)).await;

        let entries = sink.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.action, action_types::CONTENT_UPDATE);
        assert_eq!(entry.actor_user_id, Some(42));
        let detail = entry.detail.as_ref().unwrap();
        assert_eq!(detail["version"], 2);
        assert!(detail["changedSections"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["section"] == "couple" && c["status"] == "added"));
    }
}
