use contracts::domain::common::ValidationError;
use thiserror::Error;

/// Failures reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("identification '{0}' is already in use")]
    UniqueViolation(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        StorageError::Backend(cause.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::backend(format!("serialization: {}", e))
    }
}

impl From<redis::RedisError> for StorageError {
    fn from(e: redis::RedisError) -> Self {
        StorageError::backend(format!("redis: {}", e))
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::backend(format!("remote: {}", e))
    }
}

/// Errors returned by the lifecycle services
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} with identification '{identification}' already exists")]
    Conflict {
        entity: &'static str,
        identification: String,
    },

    #[error("{entity} with {key} '{value}' not found")]
    NotFound {
        entity: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Stable machine-readable code, shared by REST and GraphQL responses
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::Conflict { .. } => "CONFLICT",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
