use serde_json::json;
use sqlx::PgPool;
use vowpage_core::audit::{action_types, targets, AuditEntry};
use vowpage_core::diff::{DiffStatus, SectionChange};
use vowpage_db::models::audit::CreateAuditLog;
use vowpage_db::repositories::AuditLogRepo;

fn entry(slug: &str, version: i64) -> CreateAuditLog {
    let changes = [SectionChange {
        section: "hero".into(),
        status: DiffStatus::Changed,
    }];
    AuditEntry::content_update(slug, version, &changes, Some(1)).into()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_insert_and_list_for_target(pool: PgPool) {
    AuditLogRepo::insert(&pool, &entry("main", 2)).await.unwrap();
    AuditLogRepo::insert(&pool, &entry("main", 3)).await.unwrap();
    AuditLogRepo::insert(&pool, &entry("other", 2)).await.unwrap();

    let rows = AuditLogRepo::list_for_target(&pool, targets::PAGE_CONTENT, "main", 10)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.action_type == action_types::CONTENT_UPDATE));
    assert_eq!(rows[0].user_id, Some(1));
    assert_eq!(
        rows[0].details_json.as_ref().unwrap()["changedSections"],
        json!([{"section": "hero", "status": "changed"}])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_insert_returns_every_row(pool: PgPool) {
    let entries: Vec<CreateAuditLog> = (2..6).map(|v| entry("main", v)).collect();
    let rows = AuditLogRepo::batch_insert(&pool, &entries).await.unwrap();
    assert_eq!(rows.len(), 4);

    assert!(AuditLogRepo::batch_insert(&pool, &[]).await.unwrap().is_empty());
}
