//! Lawyer credential verification.
//!
//! Two halves share one store:
//! 1. **Verification engine**: classifies a submitted (national ID, letter ID)
//!    pair as matched, partially mismatched, or unregistered, and queues
//!    unregistered pairs for manual review.
//! 2. **Review workflow**: admin operations that list the queue and approve
//!    (registering the lawyer) or reject each request, plus direct registry
//!    insertion.
//!
//! Matching is exact string comparison against the registry. Nothing here
//! authenticates documents.

pub mod engine;
pub mod error;
pub mod input;
pub mod outcome;
pub mod review;
pub mod service;

pub use engine::{DuplicatePolicy, VerificationEngine};
pub use error::VerificationError;
pub use input::{validate_input, VerificationInput};
pub use outcome::{Classification, Outcome, Step};
pub use review::ReviewWorkflow;
pub use service::{HealthSnapshot, VerificationService};
