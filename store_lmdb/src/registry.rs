//! LMDB implementation of RegistryStore.
//!
//! Records are keyed by big-endian id. Two secondary databases map each
//! identifier to the owning id; their presence is what enforces uniqueness.

use barcheck_store::{RegistryStore, StoreError};
use barcheck_types::{LawyerId, LawyerRecord, LetterId, NationalId, NewLawyer, Timestamp};

use crate::environment::decode;
use crate::{LmdbEnvironment, LmdbError};

impl RegistryStore for LmdbEnvironment {
    fn get_lawyer(&self, id: LawyerId) -> Result<Option<LawyerRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record = self.read_lawyer(&rtxn, id.get())?;
        Ok(record.filter(|l| l.verified))
    }

    fn find_by_pair(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        // National IDs are unique, so the pair can only live on that record.
        Ok(self
            .find_by_national_id(national_id)?
            .filter(|l| &l.letter_id == letter_id))
    }

    fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record = self.read_lawyer_via(
            &rtxn,
            &self.national_id_index,
            national_id.as_str().as_bytes(),
        )?;
        Ok(record.filter(|l| l.verified))
    }

    fn find_by_letter_id(&self, letter_id: &LetterId) -> Result<Option<LawyerRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record =
            self.read_lawyer_via(&rtxn, &self.letter_id_index, letter_id.as_str().as_bytes())?;
        Ok(record.filter(|l| l.verified))
    }

    fn insert_lawyer(
        &self,
        lawyer: NewLawyer,
        created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let record = self.insert_lawyer_in(&mut wtxn, lawyer, created_at)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(lawyer = %record.id, "lawyer record committed");
        Ok(record)
    }

    fn list_lawyers(&self) -> Result<Vec<LawyerRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.lawyers_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            results.push(decode::<LawyerRecord>(val)?);
        }
        Ok(results)
    }

    fn lawyer_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.lawyers_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
