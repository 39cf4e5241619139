use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;
use vowpage_core::store::{CasOutcome, ContentStore};
use vowpage_db::repositories::PageContentRepo;
use vowpage_db::PgContentStore;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    vowpage_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_absent_slug_loads_nothing(pool: PgPool) {
    let store = PgContentStore::new(pool.clone());
    assert!(store.load("main").await.unwrap().is_none());
    assert_eq!(PageContentRepo::current_version(&pool, "main").await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_write_creates_version_two(pool: PgPool) {
    let store = PgContentStore::new(pool);
    let outcome = store
        .compare_and_swap("main", 1, json!({"hero": {"title": "Hi"}}))
        .await
        .unwrap();
    assert_eq!(outcome, CasOutcome::Committed { version: 2 });

    let record = store.load("main").await.unwrap().unwrap();
    assert_eq!(record.version, 2);
    assert_eq!(record.content["hero"]["title"], "Hi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_versions_advance_one_at_a_time(pool: PgPool) {
    let store = PgContentStore::new(pool);
    let mut expected = 1;
    for i in 0..4 {
        let outcome = store
            .compare_and_swap("main", expected, json!({"n": i}))
            .await
            .unwrap();
        assert_eq!(outcome, CasOutcome::Committed { version: expected + 1 });
        expected += 1;
    }
    assert_eq!(store.load("main").await.unwrap().unwrap().content, json!({"n": 3}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_write_conflicts_and_changes_nothing(pool: PgPool) {
    let store = PgContentStore::new(pool);
    store.compare_and_swap("main", 1, json!({"v": "a"})).await.unwrap();

    let outcome = store.compare_and_swap("main", 1, json!({"v": "b"})).await.unwrap();
    assert_eq!(outcome, CasOutcome::Conflict { current: 2 });

    let outcome = store.compare_and_swap("main", 7, json!({"v": "c"})).await.unwrap();
    assert_eq!(outcome, CasOutcome::Conflict { current: 2 });

    let record = store.load("main").await.unwrap().unwrap();
    assert_eq!(record.version, 2);
    assert_eq!(record.content, json!({"v": "a"}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_first_writes_have_one_winner(pool: PgPool) {
    let store = PgContentStore::new(pool);
    let (a, b) = tokio::join!(
        store.compare_and_swap("main", 1, json!({"who": "a"})),
        store.compare_and_swap("main", 1, json!({"who": "b"})),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    let committed = outcomes
        .iter()
        .filter(|o| matches!(o, CasOutcome::Committed { version: 2 }))
        .count();
    assert_eq!(committed, 1);
    assert!(outcomes.contains(&CasOutcome::Conflict { current: 2 }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_slug_is_rejected_by_schema(pool: PgPool) {
    let result = PageContentRepo::insert_or_advance_initial(&pool, "Bad Slug", &json!({})).await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}
