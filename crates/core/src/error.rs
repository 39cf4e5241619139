use crate::schema::SchemaValidationError;
use crate::store::StoreError;
use crate::types::Version;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    #[error("Version conflict: latest version is {latest_version}")]
    VersionConflict { latest_version: Version },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => CoreError::StorageUnavailable(msg),
            StoreError::Corrupt(msg) => CoreError::Internal(msg),
        }
    }
}
