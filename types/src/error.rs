//! Format errors raised while parsing credential identifiers.

use thiserror::Error;

use crate::identity::Field;

/// A credential identifier does not match its literal pattern.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{} format is incorrect. Please use format: {}", .0.label(), .0.example())]
    Malformed(Field),

    #[error("{} is required", .0.label())]
    Missing(Field),
}

impl FormatError {
    /// The field that failed validation.
    pub fn field(&self) -> Field {
        match self {
            FormatError::Malformed(field) | FormatError::Missing(field) => *field,
        }
    }
}
