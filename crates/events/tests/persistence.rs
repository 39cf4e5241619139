use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use vowpage_core::audit::targets;
use vowpage_core::memory_store::MemoryContentStore;
use vowpage_core::repository::{Actor, ContentRepository, VersionedRepository};
use vowpage_db::repositories::AuditLogRepo;
use vowpage_events::{AuditBus, AuditPersistence};

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_committed_writes_are_persisted(pool: PgPool) {
    let bus = Arc::new(AuditBus::default());
    let persistence = tokio::spawn(AuditPersistence::run(pool.clone(), bus.subscribe()));

    let repo = VersionedRepository::new(Arc::new(MemoryContentStore::new()), bus.clone());
    let doc = json!({"couple": {"groomName": "Minjun", "brideName": "Seoyeon"}});
    repo.write("main", 1, &doc, Actor::user(3)).await.unwrap();
    repo.write("main", 2, &doc, Actor::user(3)).await.unwrap();
    // Rejected write: no entry.
    let _ = repo.write("main", 1, &doc, Actor::user(3)).await;

    drop(repo);
    drop(bus);
    persistence.await.unwrap();

    let rows = AuditLogRepo::list_for_target(&pool, targets::PAGE_CONTENT, "main", 10)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.user_id == Some(3)));
}
