//! Verification engine: classifies a submitted pair and queues unregistered
//! pairs for manual review.
//!
//! The public contract is two-phase. [`VerificationEngine::classify`] only
//! reads; [`VerificationEngine::record_pending_request`] is the single write.
//! [`VerificationEngine::verify`] runs validation, classification and (for
//! unregistered pairs) the write in sequence.

use std::sync::Arc;

use barcheck_store::{RegistryStore, RequestStore};
use barcheck_types::{Clock, Field, LetterId, NationalId, VerificationRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::input::{validate_input, VerificationInput};
use crate::outcome::{Classification, Outcome};
use crate::VerificationError;

/// What to do when an unregistered pair is submitted again while an earlier
/// request for it is still pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Every submission queues a new request (at-least-once).
    #[default]
    Accumulate,
    /// Hand back the oldest pending request for the same pair.
    Reuse,
}

pub struct VerificationEngine<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    duplicate_policy: DuplicatePolicy,
}

impl<S> VerificationEngine<S>
where
    S: RegistryStore + RequestStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Validate, classify, and queue the pair if it is unregistered.
    ///
    /// Malformed input fails before any store access. Only the `Pending`
    /// outcome writes.
    pub fn verify(&self, input: &VerificationInput) -> Result<Outcome, VerificationError> {
        let (national_id, letter_id) = validate_input(input).inspect_err(|e| {
            warn!(error = %e, "rejected malformed verification input");
        })?;

        match self.classify(&national_id, &letter_id)? {
            Classification::Matched(record) => {
                info!(lawyer = %record.id, "credentials matched");
                Ok(Outcome::Matched {
                    full_name: record.full_name,
                })
            }
            Classification::PartialMismatch { incorrect } => {
                info!(incorrect = %incorrect, "credentials partially matched");
                Ok(Outcome::partial_mismatch(incorrect))
            }
            Classification::Unregistered => {
                let request = self.record_pending_request(&national_id, &letter_id)?;
                Ok(Outcome::pending(request.id))
            }
        }
    }

    /// Classify a well-formed pair against the registry. Never writes.
    ///
    /// When each identifier matches a *different* record the pair is treated
    /// as unregistered, so it goes to manual review.
    pub fn classify(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
    ) -> Result<Classification, VerificationError> {
        if let Some(record) = self.store.find_by_pair(national_id, letter_id)? {
            if record.verified {
                return Ok(Classification::Matched(record));
            }
        }

        let by_national_id = self.store.find_by_national_id(national_id)?.is_some();
        let by_letter_id = self.store.find_by_letter_id(letter_id)?.is_some();
        debug!(by_national_id, by_letter_id, "no exact registry match");

        Ok(match (by_national_id, by_letter_id) {
            (true, false) => Classification::PartialMismatch {
                incorrect: Field::LetterId,
            },
            (false, true) => Classification::PartialMismatch {
                incorrect: Field::NationalId,
            },
            _ => Classification::Unregistered,
        })
    }

    /// Queue the pair for manual review.
    ///
    /// Under [`DuplicatePolicy::Reuse`] an existing pending request for the
    /// same pair is returned instead of creating a new one.
    pub fn record_pending_request(
        &self,
        national_id: &NationalId,
        letter_id: &LetterId,
    ) -> Result<VerificationRequest, VerificationError> {
        if self.duplicate_policy == DuplicatePolicy::Reuse {
            let existing = self.store.list_requests()?.into_iter().find(|r| {
                r.is_pending() && &r.national_id == national_id && &r.letter_id == letter_id
            });
            if let Some(request) = existing {
                debug!(request = %request.id, "reusing pending request for identical pair");
                return Ok(request);
            }
        }

        let request = self
            .store
            .insert_request(national_id, letter_id, self.clock.now())?;
        info!(request = %request.id, "queued credentials for manual review");
        Ok(request)
    }
}
