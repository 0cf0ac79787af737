//! Fundamental types for lawyer credential verification.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! the two credential identifiers and their format rules, registry records,
//! manual-review requests, identifiers and timestamps.

pub mod error;
pub mod identity;
pub mod lawyer;
pub mod request;
pub mod time;

pub use error::FormatError;
pub use identity::{Field, LetterId, NationalId};
pub use lawyer::{LawyerId, LawyerRecord, NewLawyer};
pub use request::{RequestId, RequestStatus, ReviewStamp, TransitionError, VerificationRequest};
pub use time::{Clock, SystemClock, Timestamp};
