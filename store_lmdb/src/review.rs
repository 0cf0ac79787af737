//! LMDB implementation of ReviewStore.
//!
//! Each transition is one write transaction. Any early return drops the
//! transaction, which aborts it, so a failed approve leaves neither a
//! registry record nor a consumed id behind.

use barcheck_store::{ReviewStore, StoreError};
use barcheck_types::{
    LawyerRecord, NewLawyer, RequestId, RequestStatus, ReviewStamp, VerificationRequest,
};
use heed::RwTxn;

use crate::keys::id_key;
use crate::{LmdbEnvironment, LmdbError};

impl LmdbEnvironment {
    fn load_pending(
        &self,
        wtxn: &mut RwTxn,
        id: RequestId,
        to: RequestStatus,
    ) -> Result<VerificationRequest, StoreError> {
        let request = self
            .read_request(wtxn, id.get())?
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        if !request.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition(format!(
                "request {id} is {}",
                request.status
            )));
        }
        Ok(request)
    }

    fn remove_request_in(&self, wtxn: &mut RwTxn, id: RequestId) -> Result<(), StoreError> {
        let deleted = self
            .requests_db
            .delete(wtxn, &id_key(id.get()))
            .map_err(LmdbError::from)?;
        if !deleted {
            return Err(LmdbError::Corruption(format!("request {id} vanished mid-transaction")).into());
        }
        Ok(())
    }
}

impl ReviewStore for LmdbEnvironment {
    fn approve_request(
        &self,
        id: RequestId,
        full_name: &str,
        stamp: ReviewStamp,
    ) -> Result<(LawyerRecord, VerificationRequest), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut request = self.load_pending(&mut wtxn, id, RequestStatus::Approved)?;

        let lawyer = NewLawyer::new(
            request.national_id.clone(),
            request.letter_id.clone(),
            full_name,
        );
        let record = self.insert_lawyer_in(&mut wtxn, lawyer, stamp.at)?;

        request.resolve(RequestStatus::Approved, stamp)?;
        self.remove_request_in(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(request = %id, lawyer = %record.id, "approval committed");
        Ok((record, request))
    }

    fn reject_request(
        &self,
        id: RequestId,
        stamp: ReviewStamp,
    ) -> Result<VerificationRequest, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut request = self.load_pending(&mut wtxn, id, RequestStatus::Rejected)?;
        request.resolve(RequestStatus::Rejected, stamp)?;
        self.remove_request_in(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(request = %id, "rejection committed");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcheck_store::{RegistryStore, RequestStore};
    use barcheck_types::{LetterId, NationalId, Timestamp};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn queue(env: &LmdbEnvironment, nid: &str, lid: &str) -> VerificationRequest {
        env.insert_request(
            &NationalId::parse(nid).unwrap(),
            &LetterId::parse(lid).unwrap(),
            Timestamp::new(100),
        )
        .unwrap()
    }

    #[test]
    fn approve_registers_lawyer_and_clears_request() {
        let (_dir, env) = temp_env();
        let req = queue(&env, "44444-4444444-4", "LTR-44444");

        let (record, resolved) = env
            .approve_request(req.id, "Jane Doe", ReviewStamp::new("admin", Timestamp::new(200)))
            .unwrap();

        assert_eq!(record.full_name, "Jane Doe");
        assert!(record.verified);
        assert_eq!(resolved.status, RequestStatus::Approved);
        assert_eq!(resolved.reviewed_at, Some(Timestamp::new(200)));
        assert!(env.get_request(req.id).unwrap().is_none());
        assert!(env
            .find_by_pair(&req.national_id, &req.letter_id)
            .unwrap()
            .is_some());
    }

    #[test]
    fn approve_conflict_rolls_back_everything() {
        let (_dir, env) = temp_env();
        env.insert_lawyer(
            NewLawyer::new(
                NationalId::parse("44444-4444444-4").unwrap(),
                LetterId::parse("LTR-00000").unwrap(),
                "Existing",
            ),
            Timestamp::new(1),
        )
        .unwrap();
        let req = queue(&env, "44444-4444444-4", "LTR-44444");

        let err = env
            .approve_request(req.id, "Jane", ReviewStamp::new("admin", Timestamp::new(2)))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert!(env.get_request(req.id).unwrap().unwrap().is_pending());
        assert_eq!(env.lawyer_count().unwrap(), 1);
    }

    #[test]
    fn reject_clears_request_without_registering() {
        let (_dir, env) = temp_env();
        let req = queue(&env, "55555-5555555-5", "LTR-55555");
        let resolved = env
            .reject_request(req.id, ReviewStamp::new("admin", Timestamp::new(3)))
            .unwrap();
        assert_eq!(resolved.status, RequestStatus::Rejected);
        assert_eq!(env.request_count().unwrap(), 0);
        assert_eq!(env.lawyer_count().unwrap(), 0);
    }

    #[test]
    fn second_decision_on_same_request_is_not_found() {
        let (_dir, env) = temp_env();
        let req = queue(&env, "55555-5555555-5", "LTR-55555");
        env.reject_request(req.id, ReviewStamp::new("admin", Timestamp::new(3)))
            .unwrap();
        let err = env
            .approve_request(req.id, "Late", ReviewStamp::new("admin", Timestamp::new(4)))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
