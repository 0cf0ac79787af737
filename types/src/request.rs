//! Manual-review requests and their lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::identity::{LetterId, NationalId};
use crate::time::Timestamp;

/// Store-assigned identifier of a review request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a request is in its lifecycle.
///
/// `Pending` is the only non-terminal state. A resolved request is removed
/// from the active set right after it is stamped, so the terminal states are
/// only ever observed on the value returned by the transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who resolved a request, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStamp {
    pub reviewer: String,
    pub at: Timestamp,
}

impl ReviewStamp {
    pub fn new(reviewer: impl Into<String>, at: Timestamp) -> Self {
        Self {
            reviewer: reviewer.into(),
            at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("request cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

/// A submitted pair with no registry match, awaiting an admin decision.
///
/// Pairs are not unique: the same unmatched pair may be queued more than once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub id: RequestId,
    pub national_id: NationalId,
    pub letter_id: LetterId,
    pub status: RequestStatus,
    pub submitted_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<String>,
}

impl VerificationRequest {
    /// A fresh pending request.
    pub fn pending(
        id: RequestId,
        national_id: NationalId,
        letter_id: LetterId,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            id,
            national_id,
            letter_id,
            status: RequestStatus::Pending,
            submitted_at,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Move to a terminal status and record the reviewer.
    pub fn resolve(&mut self, to: RequestStatus, stamp: ReviewStamp) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.reviewed_at = Some(stamp.at);
        self.reviewed_by = Some(stamp.reviewer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> VerificationRequest {
        VerificationRequest::pending(
            RequestId::new(1),
            NationalId::parse("12345-1234567-1").unwrap(),
            LetterId::parse("LTR-12345").unwrap(),
            Timestamp::new(1_000),
        )
    }

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn terminal_states_do_not_move() {
        for from in [RequestStatus::Approved, RequestStatus::Rejected] {
            assert!(from.is_terminal());
            for to in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Rejected,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn resolve_stamps_reviewer_and_time() {
        let mut req = request();
        req.resolve(RequestStatus::Approved, ReviewStamp::new("admin", Timestamp::new(2_000)))
            .unwrap();
        assert_eq!(req.status, RequestStatus::Approved);
        assert_eq!(req.reviewed_at, Some(Timestamp::new(2_000)));
        assert_eq!(req.reviewed_by.as_deref(), Some("admin"));
    }

    #[test]
    fn resolving_twice_fails_and_keeps_first_decision() {
        let mut req = request();
        req.resolve(RequestStatus::Rejected, ReviewStamp::new("a", Timestamp::new(5)))
            .unwrap();
        let err = req
            .resolve(RequestStatus::Approved, ReviewStamp::new("b", Timestamp::new(6)))
            .unwrap_err();
        assert_eq!(err.from, RequestStatus::Rejected);
        assert_eq!(req.reviewed_by.as_deref(), Some("a"));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RequestStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
