use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn json_post(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn compensation_route_degrades_to_fallback() {
    let (router, _) = router_with(StubGateway::failing(), Arc::new(MemoryProgressStore::default()));

    let response = router
        .oneshot(get("/api/v1/compensation?from_iata=FRA&to_iata=JFK"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "amount": 250, "currency": "EUR", "fallback": true }));
}

#[tokio::test]
async fn compensation_route_rejects_malformed_codes() {
    let (router, gateway) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));

    let response = router
        .oneshot(get("/api/v1/compensation?from_iata=FR&to_iata=JFK"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.compensation_calls(), 0);
}

#[tokio::test]
async fn airport_search_failure_is_a_bad_gateway() {
    let (router, _) = router_with(StubGateway::failing(), Arc::new(MemoryProgressStore::default()));

    let response = router
        .oneshot(get("/api/v1/airports?term=Frank"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("message").contains("500"));
}

#[tokio::test]
async fn airport_search_returns_records() {
    let (router, _) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));

    let response = router
        .oneshot(get("/api/v1/airports?term=Frankfurt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["iata_code"], "FRA");
}

#[tokio::test]
async fn estimate_route_returns_verdict() {
    let (router, _) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let payload = json!({
        "answers": [
            { "question_id": "what_happened", "value": "cancelled" },
            { "question_id": "cancellation_notice", "value": "8_14_days" }
        ],
        "flight": flight("FRA", "TFS", Some(2000.0)),
    });

    let response = router
        .oneshot(json_post("/api/v1/claims/estimate", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["eligible"], true);
    assert_eq!(body["amount"], 200);
    assert_eq!(body["reason"], "cancelled_reduced_notice");
    assert_eq!(body["fallback"], false);
}

#[tokio::test]
async fn tracked_estimate_reports_resolution() {
    let (router, _) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let payload = json!({
        "answers": [{ "question_id": "what_happened", "value": "overbooked" }],
        "flight": flight("FRA", "JFK", None),
        "live_lookup": true,
    });

    let response = router
        .oneshot(json_post("/api/v1/claims/estimate?session=visitor-7", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["resolution"], "applied");
    assert_eq!(body["generation"], 1);
    assert_eq!(body["verdict"]["amount"], 600);
}

#[tokio::test]
async fn estimate_route_rejects_invalid_flight() {
    let (router, _) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let payload = json!({
        "answers": [],
        "flight": flight("FRA", "FRA", None),
    });

    let response = router
        .oneshot(json_post("/api/v1/claims/estimate", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn order_route_lists_missing_fields() {
    let (router, gateway) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let mut payload = serde_json::to_value(order_draft()).unwrap();
    payload["email"] = serde_json::Value::Null;
    payload["terms_accepted"] = json!(false);

    let response = router
        .oneshot(json_post("/api/v1/claims/orders", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"], "incomplete");
    assert_eq!(body["missing_fields"], json!(["email", "terms_accepted"]));
    assert!(gateway.orders().is_empty());
}

#[tokio::test]
async fn order_route_accepts_complete_orders() {
    let (router, _) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let mut payload = serde_json::to_value(order_draft()).unwrap();
    payload["salutation"] = json!("frau");

    let response = router
        .oneshot(json_post("/api/v1/claims/orders", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"], "submitted");
    assert_eq!(body["receipt"]["order_id"], "ord-1001");
}

#[tokio::test]
async fn evaluate_route_derives_delay_from_flight() {
    let (router, gateway) =
        router_with(StubGateway::default(), Arc::new(MemoryProgressStore::default()));
    let mut leg = flight("FRA", "MAD", Some(1420.0));
    leg.actual_arrival = Some(leg.scheduled_arrival + chrono::Duration::minutes(190));
    let payload = json!({
        "booked_flight_ids": ["LH400-20261001"],
        "locale": "de",
        "flight": leg,
    });

    let response = router
        .oneshot(json_post("/api/v1/claims/evaluate", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"], "accepted");
    assert_eq!(gateway.evaluations()[0].delay_minutes, Some(190));
}

#[tokio::test]
async fn evaluate_route_surfaces_upstream_failure() {
    let (router, _) = router_with(StubGateway::failing(), Arc::new(MemoryProgressStore::default()));
    let payload = json!({
        "booked_flight_ids": ["LH400-20261001"],
        "locale": "de",
    });

    let response = router
        .oneshot(json_post("/api/v1/claims/evaluate", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"], "failed");
    assert_eq!(body["status"], 500);
}

#[tokio::test]
async fn progress_routes_gate_and_persist_navigation() {
    let store = Arc::new(MemoryProgressStore::default());
    let (router, _) = router_with(StubGateway::default(), store.clone());

    let response = router
        .clone()
        .oneshot(json_post(
            "/api/v1/progress/visitor-9/actions",
            json!({ "action": { "type": "request_phase", "target": 3 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["event"]["event"], "redirected");
    assert_eq!(body["event"]["phase"], 1);
    assert_eq!(body["state"]["currentPhase"], 1);

    let response = router
        .clone()
        .oneshot(json_post(
            "/api/v1/progress/visitor-9/actions",
            json!({
                "action": { "type": "advance" },
                "draft": serde_json::to_value(complete_draft()).unwrap(),
            }),
        ))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body["event"]["event"], "advanced");

    let response = router
        .oneshot(get("/api/v1/progress/visitor-9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["currentPhase"], 2);
    assert_eq!(body["completedPhases"], json!([1]));
    assert!(store.raw("flight-claim.progress:visitor-9").is_some());
}

#[tokio::test]
async fn progress_route_reports_store_outage() {
    let (router, _) = router_with(StubGateway::default(), Arc::new(UnavailableStore));

    let response = router
        .oneshot(get("/api/v1/progress/visitor-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
