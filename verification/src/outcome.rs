//! Verification results.

use barcheck_types::{Field, LawyerRecord, RequestId};
use serde::Serialize;

/// Message returned when a pair is queued for manual review.
pub const PENDING_MESSAGE: &str = "Your credentials are not in our database. \
     Your request has been submitted for manual verification by our admin team.";

/// Stage of the caller's verification journey a response points back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Step {
    EnterDetails = 1,
    Validate = 2,
    Verify = 3,
    Review = 4,
    Complete = 5,
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step as u8
    }
}

/// Read-only classification of a well-formed pair against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Both identifiers belong to the same verified record.
    Matched(LawyerRecord),
    /// Exactly one identifier is registered; `incorrect` is the other one.
    PartialMismatch { incorrect: Field },
    /// No record matches the pair as a whole or either half alone.
    Unregistered,
}

/// Final result of a verification call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Matched { full_name: String },
    PartialMismatch { incorrect: Field, reason: String },
    Pending { request_id: RequestId, message: String },
}

impl Outcome {
    pub fn partial_mismatch(incorrect: Field) -> Self {
        Outcome::PartialMismatch {
            incorrect,
            reason: partial_mismatch_reason(incorrect),
        }
    }

    pub fn pending(request_id: RequestId) -> Self {
        Outcome::Pending {
            request_id,
            message: PENDING_MESSAGE.to_string(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Matched { .. })
    }

    pub fn step(&self) -> Step {
        match self {
            Outcome::Matched { .. } => Step::Complete,
            Outcome::PartialMismatch { .. } => Step::EnterDetails,
            Outcome::Pending { .. } => Step::Review,
        }
    }
}

/// "National ID is correct, but Letter ID is incorrect. …"
pub fn partial_mismatch_reason(incorrect: Field) -> String {
    format!(
        "{} is correct, but {} is incorrect. Please verify your {} and try again.",
        incorrect.other().label(),
        incorrect.label(),
        incorrect.label()
    )
}
