//! Admin-side disposition of queued requests and direct registry edits.

use std::sync::Arc;

use barcheck_store::{ReviewStore, StoreError};
use barcheck_types::{
    Clock, LawyerRecord, LetterId, NationalId, NewLawyer, RequestId, ReviewStamp,
    VerificationRequest,
};
use tracing::{debug, error, info};

use crate::VerificationError;

const DUPLICATE_LAWYER: &str = "Lawyer with these credentials already exists";
const FULL_NAME_REQUIRED: &str = "Full name is required";

pub struct ReviewWorkflow<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ReviewWorkflow<S>
where
    S: ReviewStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Pending requests in submission order.
    pub fn list_pending(&self) -> Result<Vec<VerificationRequest>, VerificationError> {
        let pending: Vec<_> = self
            .store
            .list_requests()?
            .into_iter()
            .filter(VerificationRequest::is_pending)
            .collect();
        debug!(count = pending.len(), "listed pending requests");
        Ok(pending)
    }

    /// Register the request's pair under `full_name` and retire the request.
    ///
    /// The name is checked before the store is touched. Record creation and
    /// request removal happen in one store transaction, so a failure leaves
    /// the request pending and the registry unchanged.
    pub fn approve(
        &self,
        id: RequestId,
        full_name: &str,
        reviewer: &str,
    ) -> Result<LawyerRecord, VerificationError> {
        let full_name = required_name(full_name)?;
        let stamp = ReviewStamp::new(reviewer, self.clock.now());

        let (record, _request) = self
            .store
            .approve_request(id, full_name, stamp)
            .map_err(|e| review_error(id, e))?;
        info!(request = %id, lawyer = %record.id, reviewer, "approved verification request");
        Ok(record)
    }

    /// Mark the request rejected and retire it. Nothing is registered.
    pub fn reject(
        &self,
        id: RequestId,
        reviewer: &str,
    ) -> Result<VerificationRequest, VerificationError> {
        let stamp = ReviewStamp::new(reviewer, self.clock.now());
        let request = self
            .store
            .reject_request(id, stamp)
            .map_err(|e| review_error(id, e))?;
        info!(request = %id, reviewer, "rejected verification request");
        Ok(request)
    }

    /// Insert a record directly, bypassing the request queue.
    pub fn add_lawyer(
        &self,
        national_id: &str,
        letter_id: &str,
        full_name: &str,
    ) -> Result<LawyerRecord, VerificationError> {
        let national_id = NationalId::parse(national_id)?;
        let letter_id = LetterId::parse(letter_id)?;
        let full_name = required_name(full_name)?;

        let lawyer = NewLawyer::new(national_id, letter_id, full_name);
        let record = self
            .store
            .insert_lawyer(lawyer, self.clock.now())
            .map_err(|e| match e {
                StoreError::Duplicate(detail) => {
                    debug!(%detail, "direct insert collided with registry");
                    VerificationError::Conflict(DUPLICATE_LAWYER.to_string())
                }
                other => internal(other),
            })?;
        info!(lawyer = %record.id, "added lawyer to registry");
        Ok(record)
    }

    pub fn list_lawyers(&self) -> Result<Vec<LawyerRecord>, VerificationError> {
        Ok(self.store.list_lawyers()?)
    }
}

fn required_name(raw: &str) -> Result<&str, VerificationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VerificationError::Validation(FULL_NAME_REQUIRED.to_string()));
    }
    Ok(trimmed)
}

fn review_error(id: RequestId, e: StoreError) -> VerificationError {
    match e {
        StoreError::NotFound(_) => VerificationError::NotFound(id),
        StoreError::Duplicate(detail) => {
            debug!(request = %id, %detail, "approval collided with registry");
            VerificationError::Conflict(DUPLICATE_LAWYER.to_string())
        }
        StoreError::InvalidTransition(detail) => VerificationError::Conflict(detail),
        other => internal(other),
    }
}

fn internal(e: StoreError) -> VerificationError {
    error!(error = %e, "store failure during review");
    VerificationError::Internal(e.to_string())
}
