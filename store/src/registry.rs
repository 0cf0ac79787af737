//! Registry storage trait.

use crate::StoreError;
use barcheck_types::{LawyerId, LawyerRecord, LetterId, NationalId, NewLawyer, Timestamp};

/// Trait for the set of confirmed lawyer records.
///
/// Lookups only ever return records whose `verified` flag is set.
pub trait RegistryStore {
    /// Get a record by its store-assigned id.
    fn get_lawyer(&self, id: LawyerId) -> Result<Option<LawyerRecord>, StoreError>;

    /// Exact match on both identifiers.
    fn find_by_pair(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
    ) -> Result<Option<LawyerRecord>, StoreError>;

    /// The record registered under this national ID, if any.
    fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<LawyerRecord>, StoreError>;

    /// The record registered under this letter ID, if any.
    fn find_by_letter_id(&self, letter_id: &LetterId) -> Result<Option<LawyerRecord>, StoreError>;

    /// Register a lawyer, assigning the next id.
    ///
    /// The uniqueness check and the insert are one atomic step: returns
    /// [`StoreError::Duplicate`] if either identifier is already registered.
    fn insert_lawyer(
        &self,
        lawyer: NewLawyer,
        created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError>;

    /// All records in id order.
    fn list_lawyers(&self) -> Result<Vec<LawyerRecord>, StoreError>;

    /// Total number of records.
    fn lawyer_count(&self) -> Result<u64, StoreError>;
}
