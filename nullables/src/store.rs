//! Nullable store: thread-safe in-memory storage for tests and the `memory` backend.

use barcheck_store::{RegistryStore, RequestStore, ReviewStore, StoreError};
use barcheck_types::{
    LawyerId, LawyerRecord, LetterId, NationalId, NewLawyer, RequestId, RequestStatus,
    ReviewStamp, Timestamp, VerificationRequest,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct NullState {
    lawyers: BTreeMap<LawyerId, LawyerRecord>,
    requests: BTreeMap<RequestId, VerificationRequest>,
    last_lawyer_id: u64,
    last_request_id: u64,
}

impl NullState {
    fn insert_lawyer(
        &mut self,
        lawyer: NewLawyer,
        created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError> {
        for existing in self.lawyers.values() {
            if existing.national_id == lawyer.national_id {
                return Err(StoreError::Duplicate(format!(
                    "national ID {} already registered",
                    lawyer.national_id
                )));
            }
            if existing.letter_id == lawyer.letter_id {
                return Err(StoreError::Duplicate(format!(
                    "letter ID {} already registered",
                    lawyer.letter_id
                )));
            }
        }
        self.last_lawyer_id += 1;
        let record = lawyer.into_record(LawyerId::new(self.last_lawyer_id), created_at);
        self.lawyers.insert(record.id, record.clone());
        Ok(record)
    }

    fn verified(&self) -> impl Iterator<Item = &LawyerRecord> {
        self.lawyers.values().filter(|l| l.verified)
    }

    /// Remove a pending request after stamping it. Callers run every check
    /// that can fail before this, so nothing has to be rolled back.
    fn take_resolved(
        &mut self,
        id: RequestId,
        to: RequestStatus,
        stamp: ReviewStamp,
    ) -> Result<VerificationRequest, StoreError> {
        let mut request = self
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        request.resolve(to, stamp)?;
        self.requests.remove(&id);
        Ok(request)
    }
}

/// An in-memory registry + request store.
///
/// A single mutex over all maps gives the single-writer discipline the
/// compound transitions need. Every trait call is counted, which lets tests
/// prove that a code path never touched storage.
pub struct NullStore {
    state: Mutex<NullState>,
    accesses: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NullState::default()),
            accesses: AtomicU64::new(0),
        }
    }

    /// A store pre-populated with registry records, all created at `at`.
    pub fn with_lawyers(
        lawyers: impl IntoIterator<Item = NewLawyer>,
        at: Timestamp,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for lawyer in lawyers {
            store.insert_lawyer(lawyer, at)?;
        }
        store.reset_access_count();
        Ok(store)
    }

    /// Number of store calls made since creation or the last reset.
    pub fn access_count(&self) -> u64 {
        self.accesses.load(Ordering::SeqCst)
    }

    pub fn reset_access_count(&self) {
        self.accesses.store(0, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, NullState>, StoreError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("null store mutex poisoned".to_string()))
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore for NullStore {
    fn get_lawyer(&self, id: LawyerId) -> Result<Option<LawyerRecord>, StoreError> {
        Ok(self.state()?.lawyers.get(&id).filter(|l| l.verified).cloned())
    }

    fn find_by_pair(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        Ok(self
            .state()?
            .verified()
            .find(|l| l.matches(national_id, letter_id))
            .cloned())
    }

    fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        Ok(self
            .state()?
            .verified()
            .find(|l| &l.national_id == national_id)
            .cloned())
    }

    fn find_by_letter_id(&self, letter_id: &LetterId) -> Result<Option<LawyerRecord>, StoreError> {
        Ok(self
            .state()?
            .verified()
            .find(|l| &l.letter_id == letter_id)
            .cloned())
    }

    fn insert_lawyer(
        &self,
        lawyer: NewLawyer,
        created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError> {
        self.state()?.insert_lawyer(lawyer, created_at)
    }

    fn list_lawyers(&self) -> Result<Vec<LawyerRecord>, StoreError> {
        Ok(self.state()?.lawyers.values().cloned().collect())
    }

    fn lawyer_count(&self) -> Result<u64, StoreError> {
        Ok(self.state()?.lawyers.len() as u64)
    }
}

impl RequestStore for NullStore {
    fn insert_request(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
        submitted_at: Timestamp,
    ) -> Result<VerificationRequest, StoreError> {
        let mut state = self.state()?;
        state.last_request_id += 1;
        let request = VerificationRequest::pending(
            RequestId::new(state.last_request_id),
            national_id.clone(),
            letter_id.clone(),
            submitted_at,
        );
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn get_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, StoreError> {
        Ok(self.state()?.requests.get(&id).cloned())
    }

    fn list_requests(&self) -> Result<Vec<VerificationRequest>, StoreError> {
        Ok(self.state()?.requests.values().cloned().collect())
    }

    fn delete_request(&self, id: RequestId) -> Result<bool, StoreError> {
        Ok(self.state()?.requests.remove(&id).is_some())
    }

    fn request_count(&self) -> Result<u64, StoreError> {
        Ok(self.state()?.requests.len() as u64)
    }
}

impl ReviewStore for NullStore {
    fn approve_request(
        &self,
        id: RequestId,
        full_name: &str,
        stamp: ReviewStamp,
    ) -> Result<(LawyerRecord, VerificationRequest), StoreError> {
        let mut state = self.state()?;
        let request = state
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        if !request.status.can_transition_to(RequestStatus::Approved) {
            return Err(StoreError::InvalidTransition(format!(
                "request {id} is {}",
                request.status
            )));
        }
        let lawyer = NewLawyer::new(request.national_id, request.letter_id, full_name);
        let record = state.insert_lawyer(lawyer, stamp.at)?;
        let resolved = state.take_resolved(id, RequestStatus::Approved, stamp)?;
        tracing::trace!(request = %id, lawyer = %record.id, "null store approved request");
        Ok((record, resolved))
    }

    fn reject_request(
        &self,
        id: RequestId,
        stamp: ReviewStamp,
    ) -> Result<VerificationRequest, StoreError> {
        self.state()?
            .take_resolved(id, RequestStatus::Rejected, stamp)
    }
}

/// A store whose every call fails with a backend error.
///
/// Used to check that storage failures surface as opaque internal errors
/// and that validation failures never reach storage at all.
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, StoreError> {
        Err(StoreError::Backend("storage unavailable".to_string()))
    }
}

impl RegistryStore for FailingStore {
    fn get_lawyer(&self, _id: LawyerId) -> Result<Option<LawyerRecord>, StoreError> {
        Self::fail()
    }

    fn find_by_pair(
        &self,
        _national_id: &NationalId,
        _letter_id: &LetterId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        Self::fail()
    }

    fn find_by_national_id(
        &self,
        _national_id: &NationalId,
    ) -> Result<Option<LawyerRecord>, StoreError> {
        Self::fail()
    }

    fn find_by_letter_id(&self, _letter_id: &LetterId) -> Result<Option<LawyerRecord>, StoreError> {
        Self::fail()
    }

    fn insert_lawyer(
        &self,
        _lawyer: NewLawyer,
        _created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError> {
        Self::fail()
    }

    fn list_lawyers(&self) -> Result<Vec<LawyerRecord>, StoreError> {
        Self::fail()
    }

    fn lawyer_count(&self) -> Result<u64, StoreError> {
        Self::fail()
    }
}

impl RequestStore for FailingStore {
    fn insert_request(
        &self,
        _national_id: &NationalId,
        _letter_id: &LetterId,
        _submitted_at: Timestamp,
    ) -> Result<VerificationRequest, StoreError> {
        Self::fail()
    }

    fn get_request(&self, _id: RequestId) -> Result<Option<VerificationRequest>, StoreError> {
        Self::fail()
    }

    fn list_requests(&self) -> Result<Vec<VerificationRequest>, StoreError> {
        Self::fail()
    }

    fn delete_request(&self, _id: RequestId) -> Result<bool, StoreError> {
        Self::fail()
    }

    fn request_count(&self) -> Result<u64, StoreError> {
        Self::fail()
    }
}

impl ReviewStore for FailingStore {
    fn approve_request(
        &self,
        _id: RequestId,
        _full_name: &str,
        _stamp: ReviewStamp,
    ) -> Result<(LawyerRecord, VerificationRequest), StoreError> {
        Self::fail()
    }

    fn reject_request(
        &self,
        _id: RequestId,
        _stamp: ReviewStamp,
    ) -> Result<VerificationRequest, StoreError> {
        Self::fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nid(s: &str) -> NationalId {
        NationalId::parse(s).unwrap()
    }

    fn lid(s: &str) -> LetterId {
        LetterId::parse(s).unwrap()
    }

    fn lawyer(n: &str, l: &str, name: &str) -> NewLawyer {
        NewLawyer::new(nid(n), lid(l), name)
    }

    #[test]
    fn test_insert_and_find_lawyer() {
        let store = NullStore::new();
        let record = store
            .insert_lawyer(lawyer("12345-1234567-1", "LTR-12345", "Ayesha"), Timestamp::new(10))
            .unwrap();
        assert_eq!(record.id, LawyerId::new(1));
        assert!(record.verified);

        let found = store
            .find_by_pair(&nid("12345-1234567-1"), &lid("LTR-12345"))
            .unwrap()
            .unwrap();
        assert_eq!(found.full_name, "Ayesha");
        assert!(store
            .find_by_pair(&nid("12345-1234567-1"), &lid("LTR-99999"))
            .unwrap()
            .is_none());
        assert!(store.find_by_national_id(&nid("12345-1234567-1")).unwrap().is_some());
        assert!(store.find_by_letter_id(&lid("LTR-12345")).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let store = NullStore::new();
        store
            .insert_lawyer(lawyer("12345-1234567-1", "LTR-12345", "A"), Timestamp::new(1))
            .unwrap();
        let same_nid = store.insert_lawyer(lawyer("12345-1234567-1", "LTR-00001", "B"), Timestamp::new(2));
        assert!(matches!(same_nid, Err(StoreError::Duplicate(_))));
        let same_lid = store.insert_lawyer(lawyer("00000-0000000-0", "LTR-12345", "C"), Timestamp::new(3));
        assert!(matches!(same_lid, Err(StoreError::Duplicate(_))));
        assert_eq!(store.lawyer_count().unwrap(), 1);
    }

    #[test]
    fn test_request_ids_are_monotonic_and_never_reused() {
        let store = NullStore::new();
        let a = store
            .insert_request(&nid("11111-1111111-1"), &lid("LTR-11111"), Timestamp::new(1))
            .unwrap();
        assert!(store.delete_request(a.id).unwrap());
        let b = store
            .insert_request(&nid("11111-1111111-1"), &lid("LTR-11111"), Timestamp::new(2))
            .unwrap();
        assert!(b.id > a.id);
        assert!(!store.delete_request(a.id).unwrap());
    }

    #[test]
    fn test_list_requests_in_insertion_order() {
        let store = NullStore::new();
        for i in 0..5u64 {
            store
                .insert_request(
                    &nid(&format!("0000{i}-0000000-0")),
                    &lid(&format!("LTR-0000{i}")),
                    Timestamp::new(i),
                )
                .unwrap();
        }
        let ids: Vec<u64> = store.list_requests().unwrap().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_approve_moves_request_into_registry() {
        let store = NullStore::new();
        let req = store
            .insert_request(&nid("22222-2222222-2"), &lid("LTR-22222"), Timestamp::new(1))
            .unwrap();
        let (record, resolved) = store
            .approve_request(req.id, "Jane Doe", ReviewStamp::new("admin", Timestamp::new(9)))
            .unwrap();
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.created_at, Timestamp::new(9));
        assert_eq!(resolved.status, RequestStatus::Approved);
        assert_eq!(resolved.reviewed_by.as_deref(), Some("admin"));
        assert!(store.get_request(req.id).unwrap().is_none());
    }

    #[test]
    fn test_failed_approve_leaves_state_unchanged() {
        let store = NullStore::new();
        store
            .insert_lawyer(lawyer("22222-2222222-2", "LTR-99999", "Taken"), Timestamp::new(1))
            .unwrap();
        let req = store
            .insert_request(&nid("22222-2222222-2"), &lid("LTR-22222"), Timestamp::new(2))
            .unwrap();
        let result = store.approve_request(req.id, "Jane", ReviewStamp::new("admin", Timestamp::new(3)));
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
        let still_there = store.get_request(req.id).unwrap().unwrap();
        assert!(still_there.is_pending());
        assert_eq!(store.lawyer_count().unwrap(), 1);
    }

    #[test]
    fn test_reject_unknown_request_is_not_found() {
        let store = NullStore::new();
        let result = store.reject_request(RequestId::new(42), ReviewStamp::new("admin", Timestamp::new(1)));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_access_counter_tracks_calls() {
        let store = NullStore::with_lawyers(
            [lawyer("12345-1234567-1", "LTR-12345", "A")],
            Timestamp::new(1),
        )
        .unwrap();
        assert_eq!(store.access_count(), 0);
        store.lawyer_count().unwrap();
        store.list_requests().unwrap();
        assert_eq!(store.access_count(), 2);
    }

    #[test]
    fn test_failing_store_fails_everything() {
        let store = FailingStore;
        assert!(matches!(store.lawyer_count(), Err(StoreError::Backend(_))));
        assert!(matches!(store.list_requests(), Err(StoreError::Backend(_))));
    }
}
