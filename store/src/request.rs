//! Review-request storage trait.

use crate::StoreError;
use barcheck_types::{LetterId, NationalId, RequestId, Timestamp, VerificationRequest};

/// Trait for the active set of manual-review requests.
///
/// Ids are assigned by the store from a monotonic counter and never reused,
/// so id order is insertion order.
pub trait RequestStore {
    /// Queue a new pending request for the pair.
    fn insert_request(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
        submitted_at: Timestamp,
    ) -> Result<VerificationRequest, StoreError>;

    /// Retrieve a specific request.
    fn get_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, StoreError>;

    /// All requests in the active set, in insertion order.
    fn list_requests(&self) -> Result<Vec<VerificationRequest>, StoreError>;

    /// Remove a request. Returns `false` if it did not exist.
    fn delete_request(&self, id: RequestId) -> Result<bool, StoreError>;

    /// Number of requests in the active set.
    fn request_count(&self) -> Result<u64, StoreError>;
}
