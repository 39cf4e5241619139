use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vowpage_core::audit::AuditSink;
use vowpage_core::memory_store::MemoryContentStore;
use vowpage_core::repository::VersionedRepository;
use vowpage_core::store::ContentStore;

use vowpage_api::config::ServerConfig;
use vowpage_api::router::build_app_router;
use vowpage_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vowpage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Audit bus ---
    let audit_bus = Arc::new(vowpage_events::AuditBus::default());

    // --- Storage ---
    let mut persistence_handle = None;
    let (store, pool) = match &config.database_url {
        Some(database_url) => {
            let pool = vowpage_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            vowpage_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            vowpage_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            persistence_handle = Some(tokio::spawn(vowpage_events::AuditPersistence::run(
                pool.clone(),
                audit_bus.subscribe(),
            )));
            tracing::info!("Audit persistence started");

            let store: Arc<dyn ContentStore> =
                Arc::new(vowpage_db::PgContentStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; using the in-memory store. Content is lost on restart"
            );
            let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new());
            (store, None)
        }
    };

    // --- App state ---
    let audit_sink: Arc<dyn AuditSink> = audit_bus.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        repository: Arc::new(VersionedRepository::new(store, audit_sink)),
        pool,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The repository inside the router held the other sender; dropping the
    // last one closes the channel and lets persistence drain.
    drop(audit_bus);
    if let Some(handle) = persistence_handle {
        let drain = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(drain, handle).await.is_err() {
            tracing::warn!("Audit persistence did not drain before the shutdown timeout");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
