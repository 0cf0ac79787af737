use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corruption: {0}")]
    Corruption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for barcheck_store::StoreError {
    fn from(e: LmdbError) -> Self {
        use barcheck_store::StoreError;
        match e {
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            LmdbError::Corruption(msg) => StoreError::Corruption(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
