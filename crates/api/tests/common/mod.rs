#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vowpage_api::auth::jwt::{generate_access_token, JwtConfig};
use vowpage_api::config::ServerConfig;
use vowpage_api::router::build_app_router;
use vowpage_api::state::AppState;
use vowpage_core::audit::AuditSink;
use vowpage_core::memory_store::MemoryContentStore;
use vowpage_core::repository::VersionedRepository;
use vowpage_events::AuditBus;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const CSRF_TOKEN: &str = "csrf-test-token";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig::with_secret(TEST_JWT_SECRET),
        csrf_cookie_name: "csrf_token".to_string(),
        database_url: None,
        default_slug: "main".to_string(),
    }
}

/// Build the full application router on a fresh in-memory store.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(MemoryContentStore::new())).0
}

/// Build the router on `store`, also returning the audit bus so tests can
/// subscribe to accepted writes.
pub fn build_test_app_with(store: Arc<MemoryContentStore>) -> (Router, Arc<AuditBus>) {
    let config = test_config();
    let audit_bus = Arc::new(AuditBus::default());
    let sink: Arc<dyn AuditSink> = audit_bus.clone();

    let state = AppState {
        config: Arc::new(config.clone()),
        repository: Arc::new(VersionedRepository::new(store, sink)),
        pool: None,
    };

    (build_app_router(state, &config), audit_bus)
}

/// A valid bearer token for a user with `role`.
pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &JwtConfig::with_secret(TEST_JWT_SECRET))
        .expect("token generation should succeed")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<axum::body::Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<axum::body::Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// PATCH with a JSON body. `token` adds a bearer header; `csrf` sends the
/// same value as both header and cookie.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
    csrf: Option<&str>,
) -> Response<axum::body::Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if let Some(csrf) = csrf {
        builder = builder
            .header("x-csrf-token", csrf)
            .header("cookie", format!("csrf_token={csrf}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
