//! Compound review transitions spanning both stores.

use crate::{RegistryStore, RequestStore, StoreError};
use barcheck_types::{LawyerRecord, RequestId, ReviewStamp, VerificationRequest};

/// A backend holding both the registry and the request queue, able to apply
/// an admin decision as a single atomic unit.
///
/// Implementations must guarantee that no other write to either store is
/// observable between the steps of one transition, and that a failed
/// transition leaves both stores untouched.
pub trait ReviewStore: RegistryStore + RequestStore {
    /// Approve a pending request.
    ///
    /// Steps: load the request ([`StoreError::NotFound`]), check it is pending
    /// ([`StoreError::InvalidTransition`]), register the lawyer under the
    /// uniqueness rule ([`StoreError::Duplicate`]), stamp the request approved,
    /// delete it from the active set. Returns the new record and the stamped
    /// request.
    fn approve_request(
        &self,
        id: RequestId,
        full_name: &str,
        stamp: ReviewStamp,
    ) -> Result<(LawyerRecord, VerificationRequest), StoreError>;

    /// Reject a pending request: stamp it rejected and delete it.
    fn reject_request(
        &self,
        id: RequestId,
        stamp: ReviewStamp,
    ) -> Result<VerificationRequest, StoreError>;
}
