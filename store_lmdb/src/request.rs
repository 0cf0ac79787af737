//! LMDB implementation of RequestStore.

use barcheck_store::{RequestStore, StoreError};
use barcheck_types::{LetterId, NationalId, RequestId, Timestamp, VerificationRequest};

use crate::environment::decode;
use crate::keys::{id_key, LAST_REQUEST_ID};
use crate::{LmdbEnvironment, LmdbError};

impl RequestStore for LmdbEnvironment {
    fn insert_request(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
        submitted_at: Timestamp,
    ) -> Result<VerificationRequest, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = self.next_id(&mut wtxn, LAST_REQUEST_ID)?;
        let request = VerificationRequest::pending(
            RequestId::new(id),
            national_id.clone(),
            letter_id.clone(),
            submitted_at,
        );
        self.put_request_in(&mut wtxn, &request)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(request)
    }

    fn get_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_request(&rtxn, id.get())?)
    }

    fn list_requests(&self) -> Result<Vec<VerificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.requests_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            results.push(decode::<VerificationRequest>(val)?);
        }
        Ok(results)
    }

    fn delete_request(&self, id: RequestId) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let deleted = self
            .requests_db
            .delete(&mut wtxn, &id_key(id.get()))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(deleted)
    }

    fn request_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.requests_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
