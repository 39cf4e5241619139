//! HTTP-level integration tests for the content endpoints, on the
//! in-memory store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, patch_json, token_for, CSRF_TOKEN};
use serde_json::json;
use vowpage_core::audit::action_types;
use vowpage_core::memory_store::MemoryContentStore;

fn content(groom: &str) -> serde_json::Value {
    json!({
        "couple": {"groomName": groom, "brideName": "Seoyeon"},
        "hero": {"title": "We are getting married"}
    })
}

fn admin() -> String {
    token_for(1, "admin")
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_missing_slug_returns_fallback_at_initial_version() {
    let app = build_test_app();

    let response = get(app, "/api/v1/content?slug=never-written").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["slug"], "never-written");
    assert_eq!(json["version"], 1);
    assert!(json["content"]["hero"].is_object());
    assert!(json["content"]["qna"]["items"].is_array());
}

#[tokio::test]
async fn get_without_slug_uses_default() {
    let app = build_test_app();

    let json = body_json(get(app, "/api/v1/content").await).await;
    assert_eq!(json["slug"], "main");
}

#[tokio::test]
async fn get_with_invalid_slug_is_bad_request() {
    let app = build_test_app();

    let response = get(app, "/api/v1/content?slug=Not%20A%20Slug").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_saves_and_returns_next_version() {
    let app = build_test_app();
    let token = admin();

    let response = patch_json(
        app.clone(),
        "/api/v1/content?slug=main",
        json!({"content": content("Minjun"), "expectedVersion": 1}),
        Some(&token),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true, "version": 2}));

    let json = body_json(get(app, "/api/v1/content?slug=main").await).await;
    assert_eq!(json["version"], 2);
    assert_eq!(json["content"]["couple"]["groomName"], "Minjun");
    assert_eq!(json["content"]["hero"]["title"], "We are getting married");
}

#[tokio::test]
async fn patch_with_stale_version_conflicts_and_keeps_stored_content() {
    let app = build_test_app();
    let token = admin();

    let first = patch_json(
        app.clone(),
        "/api/v1/content",
        json!({"content": content("A"), "expectedVersion": 1}),
        Some(&token),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let stale = patch_json(
        app.clone(),
        "/api/v1/content",
        json!({"content": content("B"), "expectedVersion": 1}),
        Some(&token),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::CONFLICT);
    let json = body_json(stale).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VERSION_CONFLICT");
    assert_eq!(json["latestVersion"], 2);

    let current = body_json(get(app, "/api/v1/content").await).await;
    assert_eq!(current["content"]["couple"]["groomName"], "A");
}

#[tokio::test]
async fn patch_with_invalid_content_lists_violations() {
    let store = Arc::new(MemoryContentStore::new());
    let (app, _bus) = common::build_test_app_with(Arc::clone(&store));

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": {"couple": {"groomName": 1}}, "expectedVersion": 1}),
        Some(&admin()),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details = json["details"].as_array().expect("details must be an array");
    assert!(details
        .iter()
        .any(|d| d["path"] == json!(["couple", "groomName"])));

    use vowpage_core::store::ContentStore;
    assert!(store.load("main").await.unwrap().is_none());
}

#[tokio::test]
async fn patch_with_malformed_body_is_bad_request() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": {}}),
        Some(&admin()),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn accepted_write_is_published_to_audit_bus() {
    let (app, bus) = common::build_test_app_with(Arc::new(MemoryContentStore::new()));
    let mut rx = bus.subscribe();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": content("Minjun"), "expectedVersion": 1}),
        Some(&token_for(42, "admin")),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let entry = rx.try_recv().expect("an audit entry should be published");
    assert_eq!(entry.action, action_types::CONTENT_UPDATE);
    assert_eq!(entry.target_id.as_deref(), Some("main"));
    assert_eq!(entry.actor_user_id, Some(42));
}

// ---------------------------------------------------------------------------
// Auth and CSRF
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_without_token_is_unauthorized() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": content("A"), "expectedVersion": 1}),
        None,
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn patch_with_garbage_token_is_unauthorized() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": content("A"), "expectedVersion": 1}),
        Some("not-a-jwt"),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patch_as_non_admin_is_forbidden() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": content("A"), "expectedVersion": 1}),
        Some(&token_for(2, "editor")),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn patch_without_csrf_is_forbidden() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content",
        json!({"content": content("A"), "expectedVersion": 1}),
        Some(&admin()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patch_with_mismatched_csrf_is_forbidden() {
    let app = build_test_app();

    let request = axum::http::Request::builder()
        .method("PATCH")
        .uri("/api/v1/content")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin()))
        .header("x-csrf-token", "header-value")
        .header("cookie", "csrf_token=cookie-value")
        .body(axum::body::Body::from(
            json!({"content": content("A"), "expectedVersion": 1}).to_string(),
        ))
        .unwrap();

    let response = common::send(app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patch_with_invalid_slug_is_rejected_before_storage() {
    let app = build_test_app();

    let response = patch_json(
        app,
        "/api/v1/content?slug=../etc",
        json!({"content": content("A"), "expectedVersion": 1}),
        Some(&admin()),
        Some(CSRF_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
