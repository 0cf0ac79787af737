use std::sync::Arc;

use barcheck_store::ReviewStore;
use barcheck_types::Clock;
use serde::Serialize;

use crate::engine::{DuplicatePolicy, VerificationEngine};
use crate::review::ReviewWorkflow;
use crate::VerificationError;

/// Counts reported by the health endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub lawyers: u64,
    pub pending_requests: u64,
}

/// The engine and the review workflow wired to one store and one clock.
pub struct VerificationService<S: ?Sized> {
    store: Arc<S>,
    engine: VerificationEngine<S>,
    review: ReviewWorkflow<S>,
}

impl<S> VerificationService<S>
where
    S: ReviewStore + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: DuplicatePolicy) -> Self {
        Self {
            engine: VerificationEngine::new(store.clone(), clock.clone())
                .with_duplicate_policy(policy),
            review: ReviewWorkflow::new(store.clone(), clock),
            store,
        }
    }

    pub fn engine(&self) -> &VerificationEngine<S> {
        &self.engine
    }

    pub fn review(&self) -> &ReviewWorkflow<S> {
        &self.review
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn health(&self) -> Result<HealthSnapshot, VerificationError> {
        let lawyers = self.store.lawyer_count()?;
        let pending_requests = self
            .store
            .list_requests()?
            .iter()
            .filter(|r| r.is_pending())
            .count() as u64;
        Ok(HealthSnapshot {
            lawyers,
            pending_requests,
        })
    }
}
