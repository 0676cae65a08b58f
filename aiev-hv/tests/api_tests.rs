//! Integration tests for aiev-hv API endpoints
//!
//! Each request goes through the full router with `oneshot`; the shared
//! `AppState` carries the session between requests.

use std::sync::Arc;

use aiev_common::events::{EventBus, ReviewEvent};
use aiev_common::{DemoEvaluator, SubmissionPolicy};
use aiev_hv::{build_router, AppState, ReviewSettings};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: state with the demo evaluator and default review settings
fn setup_state() -> AppState {
    setup_state_with(ReviewSettings::default())
}

fn setup_state_with(settings: ReviewSettings) -> AppState {
    AppState::new(Arc::new(DemoEvaluator), EventBus::new(16), settings)
}

/// Test helper: send one request through a fresh router over `state`
async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn start_evaluation(state: &AppState) -> Value {
    let (status, body) = send(state, test_request("POST", "/api/evaluation")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn feedback(state: &AppState, id: u32, agree: bool) -> (StatusCode, Value) {
    send(
        state,
        json_request("PUT", &format!("/api/items/{}/feedback", id), json!({ "agree": agree })),
    )
    .await
}

async fn rating(state: &AppState, id: u32, rating: i64) -> (StatusCode, Value) {
    send(
        state,
        json_request("PUT", &format!("/api/items/{}/rating", id), json!({ "rating": rating })),
    )
    .await
}

async fn rating_raw(state: &AppState, id: &str, body: Value) -> (StatusCode, Value) {
    send(state, json_request("PUT", &format!("/api/items/{}/rating", id), body)).await
}

/// Feedback {1:T,2:F,3:T,4:T,5:F}, overrides {2:2,5:1}
async fn apply_worked_example(state: &AppState) {
    for (id, agree) in [(1, true), (2, false), (3, true), (4, true), (5, false)] {
        assert_eq!(feedback(state, id, agree).await.0, StatusCode::OK);
    }
    assert_eq!(rating(state, 2, 2).await.0, StatusCode::OK);
    assert_eq!(rating(state, 5, 1).await.0, StatusCode::OK);
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let state = setup_state();

    let (status, body) = send(&state, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "aiev-hv");
    assert!(body["version"].is_string());
    assert_eq!(body["session_active"], false);

    start_evaluation(&state).await;
    let (_, body) = send(&state, test_request("GET", "/health")).await;
    assert_eq!(body["session_active"], true);
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let state = setup_state();

    let (status, body) = send(&state, test_request("GET", "/api/buildinfo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["module"], "aiev-hv");
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
}

#[tokio::test]
async fn test_event_stream_is_sse() {
    let state = setup_state();

    let response = build_router(state)
        .oneshot(test_request("GET", "/events"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}

// =============================================================================
// Evaluation
// =============================================================================

#[tokio::test]
async fn test_endpoints_conflict_before_evaluation() {
    let state = setup_state();

    let (status, body) = send(&state, test_request("GET", "/api/session")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = feedback(&state, 1, true).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_evaluation_returns_demo_items() {
    let state = setup_state();

    let body = start_evaluation(&state).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);

    let ratings: Vec<u64> = items.iter().map(|i| i["rating"].as_u64().unwrap()).collect();
    assert_eq!(ratings, vec![4, 3, 4, 5, 2]);
    assert_eq!(items[3]["quality"], "Production Ready");

    assert_eq!(body["phase"], "reviewing");
    assert_eq!(body["policy"], "lenient");
    assert_eq!(body["can_submit"], true);
    assert!(body["summary"].is_null());
}

#[tokio::test]
async fn test_new_evaluation_replaces_session() {
    let state = setup_state();

    let first = start_evaluation(&state).await;
    feedback(&state, 1, false).await;

    let second = start_evaluation(&state).await;
    assert_ne!(first["session_id"], second["session_id"]);
    assert_eq!(second["feedback"], json!({}));
}

// =============================================================================
// Feedback and override ratings
// =============================================================================

#[tokio::test]
async fn test_feedback_and_override_rating() {
    let state = setup_state();
    start_evaluation(&state).await;

    let (status, body) = feedback(&state, 2, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedback"]["2"], false);
    assert_eq!(body["can_submit"], false);
    assert_eq!(body["missing_ratings"], json!([2]));

    let (status, body) = rating(&state, 2, 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overrides"]["2"], 1);
    assert_eq!(body["can_submit"], true);
}

#[tokio::test]
async fn test_agree_clears_override() {
    let state = setup_state();
    start_evaluation(&state).await;

    feedback(&state, 3, false).await;
    rating(&state, 3, 5).await;

    let (status, body) = feedback(&state, 3, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedback"]["3"], true);
    assert!(body["overrides"].get("3").is_none());
}

#[tokio::test]
async fn test_override_requires_disagree() {
    let state = setup_state();
    start_evaluation(&state).await;

    let (status, body) = rating(&state, 1, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OVERRIDE_NOT_ALLOWED");

    feedback(&state, 1, true).await;
    let (status, _) = rating(&state, 1, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&state, test_request("GET", "/api/session")).await;
    assert_eq!(body["overrides"], json!({}));
}

#[tokio::test]
async fn test_invalid_rating_rejected() {
    let state = setup_state();
    start_evaluation(&state).await;
    feedback(&state, 4, false).await;

    for value in [0, 6, -1] {
        let (status, body) = rating(&state, 4, value).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_RATING");
    }
}

#[tokio::test]
async fn test_unknown_item() {
    let state = setup_state();
    start_evaluation(&state).await;

    let (status, body) = feedback(&state, 42, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_ITEM");

    let (status, _) = rating(&state, 42, 3).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_integer_rating_rejected_as_invalid_rating() {
    let state = setup_state();
    start_evaluation(&state).await;
    feedback(&state, 4, false).await;

    for body in [json!({ "rating": 3.5 }), json!({ "rating": "4" }), json!({})] {
        let (status, response) =
            send(&state, json_request("PUT", "/api/items/4/rating", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response["error"]["code"], "INVALID_RATING", "body {}", body);
        assert!(response["error"]["message"].is_string());
    }

    let (_, session) = send(&state, test_request("GET", "/api/session")).await;
    assert_eq!(session["overrides"], json!({}));
}

#[tokio::test]
async fn test_malformed_feedback_body_uses_error_envelope() {
    let state = setup_state();
    start_evaluation(&state).await;

    let (status, body) = send(
        &state,
        json_request("PUT", "/api/items/1/feedback", json!({ "agree": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_unparseable_item_id_is_unknown_item() {
    let state = setup_state();
    start_evaluation(&state).await;

    for id in ["abc", "4294967296", "-1"] {
        let (status, body) = send(
            &state,
            json_request("PUT", &format!("/api/items/{}/feedback", id), json!({ "agree": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);
        assert_eq!(body["error"]["code"], "UNKNOWN_ITEM", "id {}", id);
    }

    let (status, body) = rating_raw(&state, "abc", json!({ "rating": 3 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_ITEM");
}

#[tokio::test]
async fn test_rating_checks_session_and_item_before_value() {
    let state = setup_state();

    let (status, body) = rating(&state, 1, 9).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    start_evaluation(&state).await;
    let (status, body) = rating(&state, 42, 9).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_ITEM");

    let (status, body) = rating_raw(&state, "42", json!({ "rating": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_ITEM");
}

// =============================================================================
// Submission, analysis and reset
// =============================================================================

#[tokio::test]
async fn test_submit_blocked_reports_missing_ratings() {
    let state = setup_state();
    start_evaluation(&state).await;

    feedback(&state, 2, false).await;
    feedback(&state, 5, false).await;
    rating(&state, 5, 1).await;

    let (status, body) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SUBMISSION_BLOCKED");
    assert_eq!(body["error"]["details"]["missing_ratings"], 1);
    assert_eq!(body["error"]["details"]["missing_feedback"], 0);
}

#[tokio::test]
async fn test_submit_and_analysis() {
    let state = setup_state();
    start_evaluation(&state).await;
    apply_worked_example(&state).await;

    let (status, body) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["feedback_count"], 5);
    assert_eq!(body["summary"]["agreement_count"], 3);
    assert_eq!(body["summary"]["disagreement_count"], 2);
    assert_eq!(body["summary"]["agreement_rate"], 60.0);
    assert_eq!(body["summary"]["disagreement_rate"], 40.0);
    assert!(body["submitted_at"].is_string());

    let (status, body) = send(&state, test_request("GET", "/api/analysis")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_evaluations"], 5);
    assert_eq!(
        body["rating_distribution"],
        json!({ "2": 1, "3": 1, "4": 2, "5": 1 })
    );
    assert_eq!(body["disagreement_trend"]["higher"], 0);
    assert_eq!(body["disagreement_trend"]["lower"], 2);
    assert_eq!(body["disagreement_trend"]["direction"], "humans_lower");
    assert_eq!(
        body["recommendations"]["evaluator"],
        "Recalibrate scoring weights and evaluation criteria"
    );
}

#[tokio::test]
async fn test_analysis_before_submit_conflicts() {
    let state = setup_state();
    start_evaluation(&state).await;

    let (status, body) = send(&state, test_request("GET", "/api/analysis")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOT_SUBMITTED");
}

#[tokio::test]
async fn test_submitted_session_is_frozen() {
    let state = setup_state();
    start_evaluation(&state).await;
    feedback(&state, 1, true).await;
    send(&state, test_request("POST", "/api/submit")).await;

    let (status, body) = feedback(&state, 2, true).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_SUBMITTED");

    let (status, _) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_clears_review() {
    let state = setup_state();
    let started = start_evaluation(&state).await;
    apply_worked_example(&state).await;
    send(&state, test_request("POST", "/api/submit")).await;

    let (status, body) = send(&state, test_request("POST", "/api/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], started["session_id"]);
    assert_eq!(body["phase"], "reviewing");
    assert_eq!(body["feedback"], json!({}));
    assert_eq!(body["overrides"], json!({}));
    assert!(body["summary"].is_null());
    assert_eq!(body["items"].as_array().unwrap().len(), 5);

    let (status, _) = send(&state, test_request("GET", "/api/analysis")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_strict_policy_requires_all_feedback() {
    let state = setup_state_with(ReviewSettings {
        policy: SubmissionPolicy::Strict,
        ..ReviewSettings::default()
    });
    let body = start_evaluation(&state).await;
    assert_eq!(body["policy"], "strict");
    assert_eq!(body["can_submit"], false);

    feedback(&state, 1, true).await;
    let (status, body) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["missing_feedback"], 4);

    for id in 2..=5 {
        feedback(&state, id, true).await;
    }
    let (status, body) = send(&state, test_request("POST", "/api/submit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["agreement_rate"], 100.0);
}

#[tokio::test]
async fn test_review_events_broadcast() {
    let state = setup_state();
    let mut rx = state.event_bus.subscribe();

    start_evaluation(&state).await;
    feedback(&state, 2, false).await;
    rating(&state, 2, 1).await;
    feedback(&state, 2, true).await;
    send(&state, test_request("POST", "/api/submit")).await;
    send(&state, test_request("POST", "/api/reset")).await;

    match rx.recv().await.unwrap() {
        ReviewEvent::EvaluationCompleted { item_count, .. } => assert_eq!(item_count, 5),
        other => panic!("unexpected event: {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ReviewEvent::FeedbackRecorded {
            item_id,
            agree,
            override_cleared,
            ..
        } => {
            assert_eq!(item_id, 2);
            assert!(!agree);
            assert!(!override_cleared);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ReviewEvent::OverrideRecorded { item_id, rating, .. } => {
            assert_eq!(item_id, 2);
            assert_eq!(rating.value(), 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ReviewEvent::FeedbackRecorded {
            agree,
            override_cleared,
            ..
        } => {
            assert!(agree);
            assert!(override_cleared);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ReviewEvent::Submitted { summary, .. } => {
            assert_eq!(summary.feedback_count, 1);
            assert_eq!(summary.agreement_count, 1);
            assert_eq!(summary.agreement_rate, 100.0);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(rx.recv().await.unwrap().event_type(), "SessionReset");
}
