use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use vowpage_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds `BadRequest` for bodies
/// axum could not parse.
/// Implements [`IntoResponse`] to produce the `{ success: false, code,
/// message }` envelope every failing endpoint returns.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vowpage_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(err) => {
                    extra.insert(
                        "details".into(),
                        serde_json::to_value(&err.violations).unwrap_or(Value::Null),
                    );
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.summary())
                }
                CoreError::VersionConflict { latest_version } => {
                    extra.insert("latestVersion".into(), json!(latest_version));
                    (
                        StatusCode::CONFLICT,
                        "VERSION_CONFLICT",
                        "Content was changed by someone else. Reload the latest version."
                            .to_string(),
                    )
                }
                CoreError::StorageUnavailable(msg) => {
                    tracing::error!(error = %msg, "Storage unavailable");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_UNAVAILABLE",
                        "Storage is temporarily unavailable. No changes were saved.".to_string(),
                    )
                }
                CoreError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("code".into(), Value::String(code.into()));
        body.insert("message".into(), Value::String(message));
        body.extend(extra);

        (status, axum::Json(Value::Object(body))).into_response()
    }
}
