//! Registry records for verified lawyers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{LetterId, NationalId};
use crate::time::Timestamp;

/// Store-assigned identifier of a registry record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LawyerId(u64);

impl LawyerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LawyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A confirmed lawyer in the registry.
///
/// Records are immutable once created. Both identifiers are unique across
/// the whole registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerRecord {
    pub id: LawyerId,
    pub national_id: NationalId,
    pub letter_id: LetterId,
    pub full_name: String,
    /// Always `true` for records created through the store.
    pub verified: bool,
    pub created_at: Timestamp,
}

impl LawyerRecord {
    /// Whether this record was registered under exactly this pair.
    pub fn matches(&self, national_id: &NationalId, letter_id: &LetterId) -> bool {
        &self.national_id == national_id && &self.letter_id == letter_id
    }
}

/// The fields a caller supplies when registering a lawyer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLawyer {
    pub national_id: NationalId,
    pub letter_id: LetterId,
    pub full_name: String,
}

impl NewLawyer {
    pub fn new(national_id: NationalId, letter_id: LetterId, full_name: impl Into<String>) -> Self {
        Self {
            national_id,
            letter_id,
            full_name: full_name.into(),
        }
    }

    /// Materialise the record with the store-assigned id.
    pub fn into_record(self, id: LawyerId, created_at: Timestamp) -> LawyerRecord {
        LawyerRecord {
            id,
            national_id: self.national_id,
            letter_id: self.letter_id,
            full_name: self.full_name,
            verified: true,
            created_at,
        }
    }
}
