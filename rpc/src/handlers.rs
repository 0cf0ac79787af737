//! Request handlers and their wire payloads.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use barcheck_store::ReviewStore;
use barcheck_types::{LawyerRecord, LetterId, NationalId, RequestId, RequestStatus, Timestamp};
use barcheck_verification::{
    Outcome, Step, VerificationError, VerificationInput, VerificationService,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RpcError;

pub type DynStore = dyn ReviewStore + Send + Sync;

/// Shared handler state.
pub struct AppState {
    pub service: VerificationService<DynStore>,
    /// Recorded as `reviewed_by` on every admin decision.
    pub reviewer: String,
}

pub type SharedState = Arc<AppState>;

const NOT_FOUND_MESSAGE: &str = "Verification request not found";
const FULL_NAME_REQUIRED: &str = "Full name is required";
const APPROVED_MESSAGE: &str = "Lawyer approved and added to database";
const REJECTED_MESSAGE: &str = "Verification request rejected";

// ── Verify ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    pub step: u8,
}

impl From<Outcome> for VerifyResponse {
    fn from(outcome: Outcome) -> Self {
        let step = outcome.step().into();
        let empty = VerifyResponse {
            verified: outcome.is_verified(),
            full_name: None,
            error: None,
            pending: None,
            message: None,
            request_id: None,
            step,
        };
        match outcome {
            Outcome::Matched { full_name } => VerifyResponse {
                full_name: Some(full_name),
                ..empty
            },
            Outcome::PartialMismatch { reason, .. } => VerifyResponse {
                error: Some(reason),
                ..empty
            },
            Outcome::Pending {
                request_id,
                message,
            } => VerifyResponse {
                pending: Some(true),
                message: Some(message),
                request_id: Some(request_id),
                ..empty
            },
        }
    }
}

pub async fn verify_lawyer(
    State(state): State<SharedState>,
    body: Result<Json<VerificationInput>, JsonRejection>,
) -> Result<Json<VerifyResponse>, RpcError> {
    let Json(input) =
        body.map_err(|e| RpcError::at_step(e.body_text(), Step::EnterDetails))?;
    let outcome = blocking(state, move |s| s.service.engine().verify(&input)).await?;
    Ok(Json(outcome.into()))
}

// ── Admin: request queue ─────────────────────────────────────────────────

/// A queued request as shown to reviewers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestView {
    pub id: RequestId,
    pub national_id: NationalId,
    pub letter_id: LetterId,
    pub status: RequestStatus,
    pub submitted_at: Timestamp,
}

pub async fn list_verification_requests(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PendingRequestView>>, RpcError> {
    let pending = blocking(state, |s| s.service.review().list_pending()).await?;
    Ok(Json(
        pending
            .into_iter()
            .map(|r| PendingRequestView {
                id: r.id,
                national_id: r.national_id,
                letter_id: r.letter_id,
                status: r.status,
                submitted_at: r.submitted_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

pub async fn approve_verification(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Ack>, RpcError> {
    // An absent body reads as `{}`, so the name check reports it.
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        ApproveBody::default()
    } else {
        let Json(body) = Json::<ApproveBody>::from_bytes(&body)
            .map_err(|e| RpcError::bad_request(e.body_text()))?;
        body
    };
    let full_name = body.full_name.unwrap_or_default();

    // The name is checked before the id, even when the id is unparseable.
    let Some(id) = parse_request_id(&raw_id) else {
        if full_name.trim().is_empty() {
            return Err(RpcError::bad_request(FULL_NAME_REQUIRED));
        }
        return Err(RpcError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    };
    blocking(state, move |s| {
        s.service.review().approve(id, &full_name, &s.reviewer)
    })
    .await
    .map_err(|e| not_found_for(&raw_id, e))?;
    Ok(Json(Ack::ok(APPROVED_MESSAGE)))
}

pub async fn reject_verification(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Ack>, RpcError> {
    let Some(id) = parse_request_id(&raw_id) else {
        return Err(RpcError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    };
    blocking(state, move |s| s.service.review().reject(id, &s.reviewer))
        .await
        .map_err(|e| not_found_for(&raw_id, e))?;
    Ok(Json(Ack::ok(REJECTED_MESSAGE)))
}

// ── Admin: registry ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLawyerBody {
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub letter_id: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddLawyerResponse {
    pub success: bool,
    pub lawyer: LawyerRecord,
}

pub async fn add_lawyer(
    State(state): State<SharedState>,
    body: Result<Json<AddLawyerBody>, JsonRejection>,
) -> Result<Json<AddLawyerResponse>, RpcError> {
    let Json(body) = body.map_err(|e| RpcError::bad_request(e.body_text()))?;
    let lawyer = blocking(state, move |s| {
        s.service
            .review()
            .add_lawyer(&body.national_id, &body.letter_id, &body.full_name)
    })
    .await
    .map_err(|e| match e {
        // Identifier format errors have no step outside the public flow.
        RpcError::BadRequest { message, .. } => RpcError::bad_request(message),
        other => other,
    })?;
    Ok(Json(AddLawyerResponse {
        success: true,
        lawyer,
    }))
}

pub async fn list_lawyers(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LawyerRecord>>, RpcError> {
    let lawyers = blocking(state, |s| s.service.review().list_lawyers()).await?;
    Ok(Json(lawyers))
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub lawyers: u64,
    pub pending_requests: u64,
}

pub async fn health(State(state): State<SharedState>) -> Result<Json<HealthResponse>, RpcError> {
    let snapshot = blocking(state, |s| s.service.health()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        lawyers: snapshot.lawyers,
        pending_requests: snapshot.pending_requests,
    }))
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Run a store-bound call off the async executor.
async fn blocking<T, F>(state: SharedState, f: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, VerificationError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&state)).await?;
    Ok(result?)
}

fn parse_request_id(raw: &str) -> Option<RequestId> {
    let id = raw.parse::<u64>().ok().map(RequestId::new);
    if id.is_none() {
        debug!(raw, "unparseable request id in path");
    }
    id
}

/// Not-found responses use the plain message, without the internal id.
fn not_found_for(raw_id: &str, e: RpcError) -> RpcError {
    match e {
        RpcError::NotFound(_) => {
            debug!(id = raw_id, "verification request not found");
            RpcError::NotFound(NOT_FOUND_MESSAGE.to_string())
        }
        other => other,
    }
}
