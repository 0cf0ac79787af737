//! HTTP error payloads.
//!
//! Every failure leaves the server as `{ "error": "...", "step": n }`, with
//! `step` present only where the caller can resume the verification flow.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use barcheck_verification::{Step, VerificationError};
use serde::Serialize;
use thiserror::Error;

/// Message returned for any failure whose detail must not leak.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{message}")]
    BadRequest { message: String, step: Option<Step> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        RpcError::BadRequest {
            message: message.into(),
            step: None,
        }
    }

    /// A client error that sends the caller back to `step`.
    pub fn at_step(message: impl Into<String>, step: Step) -> Self {
        RpcError::BadRequest {
            message: message.into(),
            step: Some(step),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Conflict(_) => StatusCode::CONFLICT,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<Step>,
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            RpcError::BadRequest { message, step } => ErrBody {
                error: message,
                step,
            },
            RpcError::NotFound(message) | RpcError::Conflict(message) => ErrBody {
                error: message,
                step: None,
            },
            RpcError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                ErrBody {
                    error: INTERNAL_MESSAGE.to_string(),
                    step: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<VerificationError> for RpcError {
    fn from(e: VerificationError) -> Self {
        let step = e.step();
        match e {
            VerificationError::Format(inner) => RpcError::BadRequest {
                message: inner.to_string(),
                step,
            },
            VerificationError::Validation(message) => RpcError::bad_request(message),
            e @ VerificationError::NotFound(_) => RpcError::NotFound(e.to_string()),
            VerificationError::Conflict(message) => RpcError::Conflict(message),
            VerificationError::Internal(detail) => RpcError::Internal(detail),
        }
    }
}

impl From<tokio::task::JoinError> for RpcError {
    fn from(e: tokio::task::JoinError) -> Self {
        RpcError::Internal(format!("blocking task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcheck_types::{Field, FormatError, RequestId};

    #[test]
    fn format_errors_carry_step_one() {
        let err = RpcError::from(VerificationError::Format(FormatError::Malformed(
            Field::NationalId,
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            err,
            RpcError::BadRequest {
                step: Some(Step::EnterDetails),
                ..
            }
        ));
    }

    #[test]
    fn review_errors_map_to_status_codes() {
        assert_eq!(
            RpcError::from(VerificationError::NotFound(RequestId::new(3))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RpcError::from(VerificationError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RpcError::from(VerificationError::Validation("Full name is required".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RpcError::from(VerificationError::Internal("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
