use vowpage_core::error::CoreError;
use vowpage_core::schema::{SchemaValidationError, SchemaViolation};
use vowpage_core::types::Version;

/// Errors from the content API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and an error envelope.
    #[error("Content API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        latest_version: Option<Version>,
        /// Field-level violations from a `VALIDATION_ERROR` body.
        violations: Vec<SchemaViolation>,
    },
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            // No write was confirmed.
            ClientError::Request(e) => CoreError::StorageUnavailable(e.to_string()),
            ClientError::Api {
                status,
                code,
                message,
                latest_version,
                violations,
            } => match (code.as_str(), latest_version) {
                ("VERSION_CONFLICT", Some(latest_version)) => {
                    CoreError::VersionConflict { latest_version }
                }
                ("VALIDATION_ERROR", _) if !violations.is_empty() => {
                    CoreError::Validation(SchemaValidationError { violations })
                }
                ("STORAGE_UNAVAILABLE", _) => CoreError::StorageUnavailable(message),
                ("UNAUTHORIZED", _) => CoreError::Unauthorized(message),
                ("FORBIDDEN", _) => CoreError::Forbidden(message),
                ("VALIDATION_ERROR" | "BAD_REQUEST", _) => CoreError::InvalidInput(message),
                _ if status >= 500 => CoreError::StorageUnavailable(message),
                _ => CoreError::Internal(format!("{status} {code}: {message}")),
            },
        }
    }
}
