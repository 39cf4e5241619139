use std::sync::Arc;

use vowpage_core::repository::ContentRepository;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Versioned page content.
    pub repository: Arc<dyn ContentRepository>,
    /// Database connection pool. `None` when running on the in-memory store.
    pub pool: Option<vowpage_db::DbPool>,
}
