//! HTTP-level contract tests, driven through the router with `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use barcheck_nullables::{FailingStore, NullClock, NullStore};
use barcheck_rpc::{router, AppState, DynStore};
use barcheck_types::{LetterId, NationalId, NewLawyer, Timestamp};
use barcheck_verification::{DuplicatePolicy, VerificationService};
use serde_json::{json, Value};
use tower::ServiceExt;

fn demo_store() -> Arc<DynStore> {
    let lawyers = [
        ("12345-1234567-1", "LTR-12345", "Advocate Ayesha Siddiqi"),
        ("98765-7654321-9", "LTR-54321", "Barrister Khalid Mehmood"),
    ]
    .map(|(n, l, name)| {
        NewLawyer::new(
            NationalId::parse(n).unwrap(),
            LetterId::parse(l).unwrap(),
            name,
        )
    });
    Arc::new(NullStore::with_lawyers(lawyers, Timestamp::new(1)).unwrap())
}

fn app_with(store: Arc<DynStore>) -> Router {
    router(Arc::new(AppState {
        service: VerificationService::new(
            store,
            Arc::new(NullClock::new(1_000)),
            DuplicatePolicy::Accumulate,
        ),
        reviewer: "admin".into(),
    }))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn verify(app: &Router, nid: &str, lid: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/verify-lawyer",
        Some(json!({ "nationalId": nid, "letterId": lid })),
    )
    .await
}

#[tokio::test]
async fn verify_matched() {
    let app = app_with(demo_store());
    let (status, body) = verify(&app, "98765-7654321-9", "LTR-54321").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "verified": true, "fullName": "Barrister Khalid Mehmood", "step": 5 })
    );
}

#[tokio::test]
async fn verify_partial_mismatch() {
    let app = app_with(demo_store());
    let (status, body) = verify(&app, "12345-1234567-1", "LTR-99999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], false);
    assert_eq!(body["step"], 1);
    assert_eq!(
        body["error"],
        "National ID is correct, but Letter ID is incorrect. Please verify your Letter ID and try again."
    );
}

#[tokio::test]
async fn verify_format_error() {
    let app = app_with(demo_store());
    let (status, body) = verify(&app, "12345-123", "LTR-12345").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "National ID format is incorrect. Please use format: 12345-1234567-1",
            "step": 1
        })
    );
}

#[tokio::test]
async fn verify_malformed_json_keeps_error_shape() {
    let app = app_with(demo_store());
    let request = Request::builder()
        .method("POST")
        .uri("/api/verify-lawyer")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert_eq!(body["step"], 1);
}

#[tokio::test]
async fn verify_non_string_identifier_is_format_error() {
    let app = app_with(demo_store());
    let (status, body) = send(
        &app,
        "POST",
        "/api/verify-lawyer",
        Some(json!({ "nationalId": 1234512345671u64, "letterId": "LTR-12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "National ID format is incorrect. Please use format: 12345-1234567-1",
            "step": 1
        })
    );
}

#[tokio::test]
async fn store_failure_is_opaque() {
    let app = app_with(Arc::new(FailingStore));
    let (status, body) = verify(&app, "12345-1234567-1", "LTR-12345").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn pending_then_approve_then_matched() {
    let app = app_with(demo_store());
    let (_, body) = verify(&app, "22222-2222222-2", "LTR-22222").await;
    assert_eq!(body["pending"], true);
    assert_eq!(body["step"], 4);
    let id = body["requestId"].as_u64().unwrap();

    let (status, queue) = send(&app, "GET", "/api/admin/verification-requests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        queue,
        json!([{
            "id": id,
            "nationalId": "22222-2222222-2",
            "letterId": "LTR-22222",
            "status": "pending",
            "submittedAt": 1_000
        }])
    );

    let (status, ack) = send(
        &app,
        "POST",
        &format!("/api/admin/approve-verification/{id}"),
        Some(json!({ "fullName": "Jane Doe" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ack,
        json!({ "success": true, "message": "Lawyer approved and added to database" })
    );

    let (_, queue) = send(&app, "GET", "/api/admin/verification-requests", None).await;
    assert_eq!(queue, json!([]));
    let (_, body) = verify(&app, "22222-2222222-2", "LTR-22222").await;
    assert_eq!(body["fullName"], "Jane Doe");
}

#[tokio::test]
async fn approve_errors() {
    let app = app_with(demo_store());
    let (_, body) = verify(&app, "33333-3333333-3", "LTR-33333").await;
    let id = body["requestId"].as_u64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/approve-verification/{id}"),
        Some(json!({ "fullName": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Full name is required" }));

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/approve-verification/999",
        Some(json!({ "fullName": "Jane" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Verification request not found" }));

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/approve-verification/abc",
        Some(json!({ "fullName": "Jane" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approve_without_body_asks_for_name() {
    let app = app_with(demo_store());
    let (_, body) = verify(&app, "77777-7777777-7", "LTR-77777").await;
    let id = body["requestId"].as_u64().unwrap();
    let uri = format!("/api/admin/approve-verification/{id}");

    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Full name is required" }));

    let (status, body) = send(&app, "POST", "/api/admin/approve-verification/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Full name is required" }));

    let (_, queue) = send(&app, "GET", "/api/admin/verification-requests", None).await;
    assert_eq!(queue.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reject_removes_from_queue() {
    let app = app_with(demo_store());
    let (_, body) = verify(&app, "44444-4444444-4", "LTR-44444").await;
    let id = body["requestId"].as_u64().unwrap();

    let uri = format!("/api/admin/reject-verification/{id}");
    let (status, ack) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "Verification request rejected");

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = verify(&app, "44444-4444444-4", "LTR-44444").await;
    assert_eq!(body["pending"], true);
    assert_ne!(body["requestId"].as_u64().unwrap(), id);
}

#[tokio::test]
async fn add_lawyer_and_list() {
    let app = app_with(demo_store());
    let payload = json!({
        "nationalId": "55555-5555555-5",
        "letterId": "LTR-55555",
        "fullName": "Advocate New"
    });

    let (status, body) = send(&app, "POST", "/api/admin/add-lawyer", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["lawyer"]["fullName"], "Advocate New");
    assert_eq!(body["lawyer"]["verified"], true);

    let (status, body) = send(&app, "POST", "/api/admin/add-lawyer", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Lawyer with these credentials already exists" }));

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/add-lawyer",
        Some(json!({ "nationalId": "bad", "letterId": "LTR-55556", "fullName": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("step").is_none());

    let (_, lawyers) = send(&app, "GET", "/api/admin/lawyers", None).await;
    assert_eq!(lawyers.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn health_reports_counts() {
    let app = app_with(demo_store());
    verify(&app, "66666-6666666-6", "LTR-66666").await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "lawyers": 2, "pendingRequests": 1 })
    );
}
