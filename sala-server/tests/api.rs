//! API surface tests, driven through the router with oneshot requests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde_json::{Value, json};
use tower::ServiceExt;

use sala_core::{BookingService, MemoryStore, PinAuthority, VersionedLedger};
use sala_server::{AppState, api};

fn app() -> Router {
    let ledger = Arc::new(VersionedLedger::new(MemoryStore::new()));
    let booking = BookingService::new(ledger, PinAuthority::new(Some("0000".to_string())));
    api::build_app(AppState {
        booking,
        backend: "memory",
    })
}

/// First date strictly after today that falls on `target`.
fn next(target: Weekday) -> NaiveDate {
    let mut date = chrono::Local::now().date_naive() + Days::new(1);
    while date.weekday() != target {
        date = date + Days::new(1);
    }
    date
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_backend() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn slot_table_matches_weekday_class() {
    let app = app();

    let monday = next(Weekday::Mon);
    let (status, body) = send(&app, "GET", &format!("/api/slots/{monday}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slots"], json!(["19h - 22h"]));

    let saturday = next(Weekday::Sat);
    let (_, body) = send(&app, "GET", &format!("/api/slots/{saturday}"), None).await;
    assert_eq!(
        body["data"]["slots"],
        json!(["08h - 12h", "14h - 18h", "19h - 22h"])
    );

    let (status, body) = send(&app, "GET", "/api/slots/not-a-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn reserve_conflict_and_cancel_flow() {
    let app = app();
    let saturday = next(Weekday::Sat);

    let reserve = json!({
        "date": saturday.to_string(),
        "slot_label": "08h - 12h",
        "group_name": "Choir",
        "pin": "1234",
    });
    let (status, body) = send(&app, "POST", "/api/reservations", Some(reserve.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);

    // The slot is gone from availability and a duplicate attempt conflicts.
    let (_, slots) = send(&app, "GET", &format!("/api/slots/{saturday}"), None).await;
    assert_eq!(slots["data"]["available"], json!(["14h - 18h", "19h - 22h"]));

    let (status, body) = send(&app, "POST", "/api/reservations", Some(reserve)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    // The listing shows the booking but never the PIN digest.
    let (_, listing) = send(&app, "GET", "/api/reservations", None).await;
    let rows = listing["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());
    assert!(rows[0].get("pin_digest").is_none());

    // Wrong PIN is refused, the admin secret is not, and a repeat finds
    // nothing.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/reservations/{id}/cancel"),
        Some(json!({ "pin": "9999" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/reservations/{id}/cancel"),
        Some(json!({ "pin": "0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/reservations/{id}/cancel"),
        Some(json!({ "pin": "0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn unusable_input_is_a_validation_error() {
    let app = app();
    let saturday = next(Weekday::Sat);

    let (status, body) = send(
        &app,
        "POST",
        "/api/reservations",
        Some(json!({
            "date": saturday.to_string(),
            "slot_label": "08h - 12h",
            "group_name": "   ",
            "pin": "1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // A weekday does not offer the weekend morning slot.
    let monday = next(Weekday::Mon);
    let (status, _) = send(
        &app,
        "POST",
        "/api/reservations",
        Some(json!({
            "date": monday.to_string(),
            "slot_label": "08h - 12h",
            "group_name": "Choir",
            "pin": "1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
