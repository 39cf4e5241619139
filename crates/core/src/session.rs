//! Draft/edit session: the client-side loop that ties the path accessor,
//! the normalizer and a [`ContentRepository`] together.
//!
//! A session is a value. [`EditSession::edit`] returns a new session and
//! leaves the receiver intact, so older sessions remain usable as undo
//! points. Every applied operation is kept in the session's history so a
//! conflicting save can be replayed onto fresher content.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::node::{Node, NodeMap};
use crate::path::{self, Path, PathError};
use crate::repository::{Actor, ContentRepository, VersionedContent};
use crate::schema;
use crate::types::Version;

// ---------------------------------------------------------------------------
// Path operations
// ---------------------------------------------------------------------------

/// One edit against the draft tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathOp {
    Set { path: Path, value: Node },
    Push { path: Path, item: Node },
    RemoveAt { path: Path, index: usize },
    Move { path: Path, from: usize, to: usize },
    Patch { path: Path, fields: NodeMap },
}

impl PathOp {
    pub fn set(path: Path, value: impl Into<Node>) -> Self {
        Self::Set {
            path,
            value: value.into(),
        }
    }

    pub fn push(path: Path, item: impl Into<Node>) -> Self {
        Self::Push {
            path,
            item: item.into(),
        }
    }

    pub fn remove_at(path: Path, index: usize) -> Self {
        Self::RemoveAt { path, index }
    }

    pub fn move_within(path: Path, from: usize, to: usize) -> Self {
        Self::Move { path, from, to }
    }

    pub fn patch(path: Path, fields: NodeMap) -> Self {
        Self::Patch { path, fields }
    }

    /// Apply leniently: an unaddressable path leaves `root` unchanged.
    pub fn apply(&self, root: &Node) -> Node {
        match self {
            Self::Set { path, value } => path::set(root, path, value.clone()),
            Self::Push { path, item } => path::push(root, path, item.clone()),
            Self::RemoveAt { path, index } => path::remove_at(root, path, *index),
            Self::Move { path, from, to } => path::move_within(root, path, *from, *to),
            Self::Patch { path, fields } => path::patch(root, path, fields),
        }
    }

    pub fn try_apply(&self, root: &Node) -> Result<Node, PathError> {
        match self {
            Self::Set { path, value } => path::try_set(root, path, value.clone()),
            Self::Push { path, item } => path::try_push(root, path, item.clone()),
            Self::RemoveAt { path, index } => path::try_remove_at(root, path, *index),
            Self::Move { path, from, to } => path::try_move_within(root, path, *from, *to),
            Self::Patch { path, fields } => path::try_patch(root, path, fields),
        }
    }
}

// ---------------------------------------------------------------------------
// Uploaded assets
// ---------------------------------------------------------------------------

/// What the upload service returns for a stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub path: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Where the fields of an [`UploadedAsset`] land in the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBinding {
    pub url: Path,
    pub alt: Option<Path>,
    pub width: Option<Path>,
    pub height: Option<Path>,
}

impl AssetBinding {
    pub fn hero() -> Self {
        let hero = Path::root().field("hero");
        Self {
            url: hero.clone().field("imageUrl"),
            alt: Some(hero.clone().field("imageAlt")),
            width: Some(hero.clone().field("imageWidth")),
            height: Some(hero.field("imageHeight")),
        }
    }

    pub fn gallery_image(index: usize) -> Self {
        let image = Path::root().field("gallery").field("images").index(index);
        Self {
            url: image.clone().field("url"),
            alt: Some(image.clone().field("alt")),
            width: Some(image.clone().field("width")),
            height: Some(image.field("height")),
        }
    }

    fn ops(&self, asset: &UploadedAsset) -> Vec<PathOp> {
        let mut ops = vec![PathOp::set(self.url.clone(), asset.url.as_str())];
        let optional = [
            (&self.alt, asset.alt_default.as_deref().map(Node::from)),
            (&self.width, asset.width.map(Node::from)),
            (&self.height, asset.height.map(Node::from)),
        ];
        for (target, value) in optional {
            if let (Some(target), Some(value)) = (target, value) {
                ops.push(PathOp::set(target.clone(), value));
            }
        }
        ops
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The last known-good content and the version it was read or saved at.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub version: Version,
    pub content: Node,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    slug: String,
    source: Source,
    draft: Node,
    history: Vec<PathOp>,
}

impl EditSession {
    /// Read `slug` and start with a draft equal to the source.
    pub async fn begin(repo: &dyn ContentRepository, slug: &str) -> Result<Self, CoreError> {
        let read = repo.read(slug).await?;
        Ok(Self::from_read(read))
    }

    fn from_read(read: VersionedContent) -> Self {
        let content = read.content.to_node();
        Self {
            slug: read.slug,
            draft: content.clone(),
            source: Source {
                version: read.version,
                content,
            },
            history: Vec::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn version(&self) -> Version {
        self.source.version
    }

    pub fn draft(&self) -> &Node {
        &self.draft
    }

    pub fn history(&self) -> &[PathOp] {
        &self.history
    }

    /// Apply `op` leniently and return the resulting session.
    pub fn edit(&self, op: PathOp) -> EditSession {
        let draft = op.apply(&self.draft);
        let mut history = self.history.clone();
        history.push(op);
        EditSession {
            slug: self.slug.clone(),
            source: self.source.clone(),
            draft,
            history,
        }
    }

    /// Like [`edit`](Self::edit), but an unaddressable path is an error and
    /// nothing is recorded.
    pub fn apply_strict(&self, op: PathOp) -> Result<EditSession, PathError> {
        let draft = op.try_apply(&self.draft)?;
        let mut history = self.history.clone();
        history.push(op);
        Ok(EditSession {
            slug: self.slug.clone(),
            source: self.source.clone(),
            draft,
            history,
        })
    }

    /// Thread an upload result into the draft at the binding's paths.
    pub fn apply_asset(&self, asset: &UploadedAsset, binding: &AssetBinding) -> EditSession {
        binding
            .ops(asset)
            .into_iter()
            .fold(self.clone(), |session, op| session.edit(op))
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.source.content
    }

    /// Discard unsaved edits.
    pub fn reset(&self) -> EditSession {
        EditSession {
            slug: self.slug.clone(),
            source: self.source.clone(),
            draft: self.source.content.clone(),
            history: Vec::new(),
        }
    }

    /// Normalize the draft and commit it against the source version.
    ///
    /// A conflict is an outcome, not an error: the latest content is read
    /// back and handed to the caller inside [`ConflictOutcome`]. If that
    /// read fails, the result is [`CoreError::VersionConflict`] rather than
    /// the read error. Validation and storage failures are errors and leave
    /// the session unsaved.
    pub async fn save(
        self,
        repo: &dyn ContentRepository,
        actor: Actor,
    ) -> Result<SaveOutcome, CoreError> {
        let normalized = schema::normalize_node(&self.draft)?;
        let candidate = normalized.to_value();

        match repo
            .write(&self.slug, self.source.version, &candidate, actor)
            .await
        {
            Ok(version) => {
                let content = normalized.to_node();
                tracing::debug!(slug = %self.slug, version, "Draft saved");
                Ok(SaveOutcome::Saved(EditSession {
                    slug: self.slug,
                    draft: content.clone(),
                    source: Source { version, content },
                    history: Vec::new(),
                }))
            }
            Err(CoreError::VersionConflict { latest_version }) => {
                tracing::info!(
                    slug = %self.slug,
                    expected_version = self.source.version,
                    latest_version,
                    "Save conflicted, reloading latest content",
                );
                let fresh = match repo.read(&self.slug).await {
                    Ok(read) => Self::from_read(read),
                    Err(error) => {
                        // The conflict still surfaces when the reload fails.
                        tracing::warn!(
                            slug = %self.slug,
                            latest_version,
                            error = %error,
                            "Reload after conflict failed",
                        );
                        return Err(CoreError::VersionConflict { latest_version });
                    }
                };
                Ok(SaveOutcome::Conflict(ConflictOutcome {
                    fresh,
                    stale_draft: self.draft,
                    history: self.history,
                }))
            }
            Err(other) => Err(other),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(EditSession),
    Conflict(ConflictOutcome),
}

/// A save lost the race. Holds the freshly read source and the edits that
/// did not make it, and lets the caller pick how to continue.
#[derive(Debug, Clone)]
pub struct ConflictOutcome {
    fresh: EditSession,
    stale_draft: Node,
    history: Vec<PathOp>,
}

impl ConflictOutcome {
    pub fn latest_version(&self) -> Version {
        self.fresh.version()
    }

    pub fn latest(&self) -> &Source {
        self.fresh.source()
    }

    /// The draft that failed to save, for manual reconciliation.
    pub fn stale_draft(&self) -> &Node {
        &self.stale_draft
    }

    pub fn history(&self) -> &[PathOp] {
        &self.history
    }

    /// Drop the unsaved edits and continue from the latest content.
    pub fn discard(self) -> EditSession {
        self.fresh
    }

    /// Re-apply the unsaved edits, in order, onto the latest content.
    pub fn replay(self) -> EditSession {
        self.history
            .into_iter()
            .fold(self.fresh, |session, op| session.edit(op))
    }

    /// [`replay`](Self::replay), then save exactly once.
    pub async fn retry(
        self,
        repo: &dyn ContentRepository,
        actor: Actor,
    ) -> Result<SaveOutcome, CoreError> {
        self.replay().save(repo, actor).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::audit::NoopAuditSink;
    use crate::memory_store::MemoryContentStore;
    use crate::repository::VersionedRepository;
    use crate::schema::Side;

    fn p(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    fn repo_over(store: Arc<MemoryContentStore>) -> VersionedRepository {
        VersionedRepository::new(store, Arc::new(NoopAuditSink))
    }

    fn blank_question() -> Node {
        Node::from(json!({
            "question": "",
            "answers": [{"side": "groom", "content": ""}, {"side": "bride", "content": ""}]
        }))
    }

    fn saved(outcome: Result<SaveOutcome, CoreError>) -> EditSession {
        match outcome.unwrap() {
            SaveOutcome::Saved(session) => session,
            SaveOutcome::Conflict(c) => panic!("unexpected conflict at {}", c.latest_version()),
        }
    }

    fn conflicted(outcome: Result<SaveOutcome, CoreError>) -> ConflictOutcome {
        match outcome.unwrap() {
            SaveOutcome::Conflict(conflict) => conflict,
            SaveOutcome::Saved(s) => panic!("unexpected save at {}", s.version()),
        }
    }

    #[tokio::test]
    async fn push_question_then_save_reaches_version_two() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let session = EditSession::begin(&repo, "main").await.unwrap();
        assert_eq!(session.version(), 1);

        let session = session.edit(PathOp::push(p("qna.items"), blank_question()));
        assert!(session.is_dirty());

        let session = saved(session.save(&repo, Actor::anonymous()).await);
        assert_eq!(session.version(), 2);
        assert!(!session.is_dirty());
        assert!(session.history().is_empty());

        let stored = repo.read("main").await.unwrap();
        assert_eq!(stored.version, 2);
        let items = &stored.content.qna.items;
        assert_eq!(items.len(), 1);
        let answers: Vec<(Side, &str)> = items[0]
            .answers
            .iter()
            .map(|a| (a.side, a.content.as_str()))
            .collect();
        assert_eq!(answers, [(Side::Groom, ""), (Side::Bride, "")]);
    }

    #[tokio::test]
    async fn second_session_on_same_version_conflicts() {
        let store = Arc::new(MemoryContentStore::new());
        store
            .seed("main", 3, json!({"couple": {"groomName": "G", "brideName": "B"}}))
            .await;
        let repo = repo_over(store);

        let first = EditSession::begin(&repo, "main").await.unwrap();
        let second = EditSession::begin(&repo, "main").await.unwrap();
        assert_eq!((first.version(), second.version()), (3, 3));

        let first = first.edit(PathOp::set(p("hero.title"), "From tab one"));
        let first = saved(first.save(&repo, Actor::anonymous()).await);
        assert_eq!(first.version(), 4);

        let second = second.edit(PathOp::set(p("greeting.title"), "From tab two"));
        let conflict = conflicted(second.save(&repo, Actor::anonymous()).await);
        assert_eq!(conflict.latest_version(), 4);
        assert_eq!(
            path::get(conflict.stale_draft(), &p("greeting.title")).and_then(Node::as_str),
            Some("From tab two")
        );

        let stored = repo.read("main").await.unwrap();
        assert_eq!(stored.version, 4);
        assert_eq!(stored.content.hero.title, "From tab one");
        assert_eq!(stored.content.greeting.title, "");
    }

    /// Always conflicts on write and cannot be read.
    struct StaleAndDown;

    #[async_trait::async_trait]
    impl ContentRepository for StaleAndDown {
        async fn read(&self, _slug: &str) -> Result<VersionedContent, CoreError> {
            Err(CoreError::StorageUnavailable("connection reset".into()))
        }

        async fn write(
            &self,
            _slug: &str,
            _expected_version: Version,
            _candidate: &serde_json::Value,
            _actor: Actor,
        ) -> Result<Version, CoreError> {
            Err(CoreError::VersionConflict { latest_version: 5 })
        }
    }

    #[tokio::test]
    async fn conflict_survives_failed_reload() {
        let session = EditSession::from_read(VersionedContent {
            slug: "main".into(),
            version: 1,
            content: schema::fallback_document(),
        })
        .edit(PathOp::set(p("hero.title"), "Stale"));

        let err = session
            .save(&StaleAndDown, Actor::anonymous())
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::VersionConflict { latest_version: 5 });
    }

    #[tokio::test]
    async fn conflict_discard_restarts_from_latest() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let a = EditSession::begin(&repo, "main").await.unwrap();
        let b = a.clone();

        saved(a.edit(PathOp::set(p("hero.title"), "A")).save(&repo, Actor::anonymous()).await);
        let conflict =
            conflicted(b.edit(PathOp::set(p("hero.subtitle"), "B")).save(&repo, Actor::anonymous()).await);

        let fresh = conflict.discard();
        assert_eq!(fresh.version(), 2);
        assert!(!fresh.is_dirty());
        assert_eq!(
            path::get(fresh.draft(), &p("hero.title")).and_then(Node::as_str),
            Some("A")
        );
    }

    #[tokio::test]
    async fn conflict_retry_replays_edits_once() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let a = EditSession::begin(&repo, "main").await.unwrap();
        let b = a.clone();

        saved(a.edit(PathOp::set(p("hero.title"), "A")).save(&repo, Actor::anonymous()).await);
        let conflict =
            conflicted(b.edit(PathOp::set(p("hero.subtitle"), "B")).save(&repo, Actor::anonymous()).await);
        assert_eq!(conflict.history().len(), 1);

        let merged = saved(conflict.retry(&repo, Actor::anonymous()).await);
        assert_eq!(merged.version(), 3);

        let stored = repo.read("main").await.unwrap().content;
        assert_eq!(stored.hero.title, "A");
        assert_eq!(stored.hero.subtitle, "B");
    }

    #[tokio::test]
    async fn invalid_draft_is_not_saved() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let session = EditSession::begin(&repo, "main").await.unwrap();
        let broken = session.edit(PathOp::set(p("couple.groomName"), 12_i64));

        assert_matches!(
            broken.save(&repo, Actor::anonymous()).await,
            Err(CoreError::Validation(_))
        );
        assert_eq!(repo.read("main").await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn edit_leaves_previous_session_intact() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let before = EditSession::begin(&repo, "main").await.unwrap();
        let after = before.edit(PathOp::set(p("hero.title"), "New"));

        assert!(!before.is_dirty());
        assert!(after.is_dirty());
        assert_eq!(before.history().len(), 0);
        assert_eq!(after.history().len(), 1);

        let reset = after.reset();
        assert!(!reset.is_dirty());
        assert!(reset.history().is_empty());
        assert_eq!(reset.draft(), before.draft());
    }

    #[tokio::test]
    async fn stale_path_edit_is_a_noop() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let session = EditSession::begin(&repo, "main").await.unwrap();

        let next = session.edit(PathOp::remove_at(p("gallery.images"), 4));
        assert!(!next.is_dirty());
        assert_matches!(
            session.apply_strict(PathOp::remove_at(p("gallery.images"), 4)),
            Err(PathError::IndexOutOfBounds { index: 4, len: 0, .. })
        );
    }

    #[tokio::test]
    async fn uploaded_asset_is_threaded_into_hero() {
        let repo = repo_over(Arc::new(MemoryContentStore::new()));
        let session = EditSession::begin(&repo, "main").await.unwrap();
        let asset: UploadedAsset = serde_json::from_value(json!({
            "url": "https://cdn.example.com/hero.jpg",
            "path": "uploads/hero.jpg",
            "bucket": "public",
            "altDefault": "The couple",
            "width": 1600
        }))
        .unwrap();

        let next = session.apply_asset(&asset, &AssetBinding::hero());
        let hero = next.draft().to_value()["hero"].clone();
        assert_eq!(hero["imageUrl"], "https://cdn.example.com/hero.jpg");
        assert_eq!(hero["imageAlt"], "The couple");
        assert_eq!(hero["imageWidth"], 1600);
        assert!(hero.get("imageHeight").is_none());
        assert!(hero.get("path").is_none());

        let saved = saved(next.save(&repo, Actor::anonymous()).await);
        let stored = repo.read(saved.slug()).await.unwrap().content;
        assert_eq!(stored.hero.image_width, Some(1600));
    }

    #[test]
    fn path_op_wire_format() {
        let op: PathOp = serde_json::from_value(json!({
            "op": "removeAt",
            "path": ["qna", "items"],
            "index": 0
        }))
        .unwrap();
        assert_eq!(op, PathOp::remove_at(p("qna.items"), 0));

        let value = serde_json::to_value(PathOp::move_within(p("gallery.images"), 0, 2)).unwrap();
        assert_eq!(value, json!({"op": "move", "path": ["gallery", "images"], "from": 0, "to": 2}));
    }
}
