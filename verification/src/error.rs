use barcheck_store::StoreError;
use barcheck_types::{Field, FormatError, RequestId};
use thiserror::Error;

use crate::outcome::Step;

#[derive(Debug, Error)]
pub enum VerificationError {
    /// Submitted identifier violates its literal pattern.
    #[error("{0}")]
    Format(#[from] FormatError),

    /// A required admin-supplied field is missing or blank.
    #[error("{0}")]
    Validation(String),

    #[error("Verification request not found: {0}")]
    NotFound(RequestId),

    #[error("{0}")]
    Conflict(String),

    /// Storage failure. The detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VerificationError {
    /// The field a format error refers to.
    pub fn field(&self) -> Option<Field> {
        match self {
            VerificationError::Format(e) => Some(e.field()),
            _ => None,
        }
    }

    /// Where the caller should resume the workflow, if the error came from
    /// the public verification path.
    pub fn step(&self) -> Option<Step> {
        match self {
            VerificationError::Format(_) => Some(Step::EnterDetails),
            _ => None,
        }
    }
}

impl From<StoreError> for VerificationError {
    fn from(e: StoreError) -> Self {
        VerificationError::Internal(e.to_string())
    }
}
