use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl From<barcheck_types::TransitionError> for StoreError {
    fn from(e: barcheck_types::TransitionError) -> Self {
        StoreError::InvalidTransition(e.to_string())
    }
}
