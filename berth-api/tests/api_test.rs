use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use berth_api::{app, AppState};
use berth_store::app_config::BookingRules;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
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
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn fleet_with_cruise(seats: u32) -> Router {
    let app = app(AppState::in_memory(&BookingRules::default()));

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/ships",
        Some(json!({ "id": 1, "age": 12, "seat_capacity": seats, "make": "Fincantieri", "model": "Vista" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/cruises",
        Some(json!({
            "number": 100,
            "ship_id": 1,
            "captain_id": null,
            "destination": "Lisbon",
            "departure_date": "2026-05-01",
            "departure_time": "09:00:00",
            "arrival_date": "2026-05-08",
            "arrival_time": "17:30:00",
            "num_stops": 3,
            "ticket_cost_cents": 125000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    app
}

async fn book(app: &Router, customer_id: i32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/cruises/100/bookings",
        Some(json!({ "customer_id": customer_id })),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = app(AppState::in_memory(&BookingRules::default()));
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_booking_flow_reserves_then_waitlists() {
    let app = fleet_with_cruise(2).await;

    let mut statuses = Vec::new();
    for customer in 1..=3 {
        let (status, body) = book(&app, customer).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cruise_number"], 100);
        statuses.push(body["status"].as_str().unwrap().to_string());
    }
    assert_eq!(statuses, vec!["RESERVED", "RESERVED", "WAITLISTED"]);

    let (status, body) = send(&app, Method::GET, "/v1/cruises/100/seats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["free_seats"], 0);

    let (_, body) = send(&app, Method::GET, "/v1/cruises/100/waitlist", None).await;
    let waitlist = body.as_array().unwrap();
    assert_eq!(waitlist.len(), 1);
    assert_eq!(waitlist[0]["customer_id"], 3);
}

#[tokio::test]
async fn test_unknown_cruise_is_not_found() {
    let app = fleet_with_cruise(2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cruises/999/bookings",
        Some(json!({ "customer_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (status, _) = send(&app, Method::GET, "/v1/cruises/999/seats", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_never_overbook() {
    let app = fleet_with_cruise(5).await;

    let mut handles = Vec::new();
    for customer in 1..=20 {
        let app = app.clone();
        handles.push(tokio::spawn(async move { book(&app, customer).await }));
    }

    let mut reserved = 0;
    let mut waitlisted = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        match body["status"].as_str().unwrap() {
            "RESERVED" => reserved += 1,
            "WAITLISTED" => waitlisted += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(reserved, 5);
    assert_eq!(waitlisted, 15);

    let (_, body) = send(&app, Method::GET, "/v1/cruises/100/passengers?status=R", None).await;
    assert_eq!(body["count"], 5);
    assert_eq!(body["status"], "RESERVED");
}

#[tokio::test]
async fn test_passenger_count_rejects_unknown_status() {
    let app = fleet_with_cruise(2).await;

    let (status, body) = send(&app, Method::GET, "/v1/cruises/100/passengers?status=X", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("X"));

    let (status, body) = send(&app, Method::GET, "/v1/cruises/100/passengers?status=waitlisted", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_cancel_frees_seat_without_promotion() {
    let app = fleet_with_cruise(1).await;

    let (_, first) = book(&app, 1).await;
    let (_, second) = book(&app, 2).await;
    assert_eq!(second["status"], "WAITLISTED");

    let uri = format!("/v1/reservations/{}", first["reservation_id"]);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::GET, "/v1/cruises/100/seats", None).await;
    assert_eq!(body["free_seats"], 1);

    let (_, body) = send(&app, Method::GET, "/v1/cruises/100/waitlist", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/v1/reservations/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_conflicts_and_repairs_report() {
    let app = fleet_with_cruise(2).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/ships",
        Some(json!({ "id": 1, "age": 3, "seat_capacity": 10, "make": "Meyer", "model": "Dawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/ships",
        Some(json!({ "id": 2, "age": 3, "seat_capacity": 10, "make": "Meyer", "model": "Dawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for (rid, ship) in [(1, 2), (2, 1), (3, 2)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/repairs",
            Some(json!({
                "id": rid,
                "ship_id": ship,
                "captain_id": null,
                "repair_date": "2026-03-14",
                "repair_code": "HULL"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/repairs",
        Some(json!({
            "id": 9,
            "ship_id": 77,
            "captain_id": null,
            "repair_date": "2026-03-14",
            "repair_code": "HULL"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/v1/reports/repairs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "ship_id": 2, "repair_count": 2 },
            { "ship_id": 1, "repair_count": 1 }
        ])
    );
}
