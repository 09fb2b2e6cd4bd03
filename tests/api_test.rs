mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use common::TestApp;

fn batch_body(code: &str) -> Value {
    json!({
        "batch_code": code,
        "received_at": "2026-08-20T08:00:00Z",
        "shelf_life_days": 14,
        "volume_liters": 500.0,
        "fat_percent": 3.5,
    })
}

async fn create_batch(app: &TestApp, body: Value) -> Value {
    let (status, payload) = app.post("/api/batches", body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {payload}");
    payload
}

#[tokio::test]
async fn create_returns_created_batch() {
    let app = TestApp::new();
    let batch = create_batch(&app, batch_body("SCH-20260820-0001")).await;

    assert!(batch["id"].as_i64().unwrap() > 0);
    assert_eq!(batch["batch_code"], "SCH-20260820-0001");
    assert_eq!(batch["shelf_life_days"], 14);
    assert_eq!(batch["volume_liters"], 500.0);
    assert_eq!(batch["fat_percent"], 3.5);
    assert_eq!(batch["is_deleted"], false);
    assert_eq!(batch["version"], 1);

    let received = DateTime::parse_from_rfc3339(batch["received_at"].as_str().unwrap()).unwrap();
    let expiry = DateTime::parse_from_rfc3339(batch["expiry"].as_str().unwrap()).unwrap();
    assert_eq!(expiry - received, Duration::days(14));
}

#[tokio::test]
async fn create_defaults_shelf_life_to_seven_days() {
    let app = TestApp::new();
    let batch = create_batch(
        &app,
        json!({
            "batch_code": "SCH-20260820-0002",
            "received_at": "2026-08-20T08:00:00Z",
            "volume_liters": 100.0,
        }),
    )
    .await;

    assert_eq!(batch["shelf_life_days"], 7);
    assert_eq!(batch["fat_percent"], Value::Null);
}

#[tokio::test]
async fn create_accepts_naive_and_offset_timestamps() {
    let app = TestApp::new();

    // naive timestamps are taken as UTC
    let naive = create_batch(
        &app,
        json!({
            "batch_code": "SCH-20260820-0003",
            "received_at": "2026-08-20T08:00:00",
            "volume_liters": 10.0,
        }),
    )
    .await;
    let got = DateTime::parse_from_rfc3339(naive["received_at"].as_str().unwrap()).unwrap();
    assert_eq!(got, "2026-08-20T08:00:00Z".parse::<DateTime<Utc>>().unwrap());

    // offsets are normalized to UTC, same instant
    let offset = create_batch(
        &app,
        json!({
            "batch_code": "SCH-20260820-0004",
            "received_at": "2026-08-20T10:00:00+02:00",
            "volume_liters": 10.0,
        }),
    )
    .await;
    let got = DateTime::parse_from_rfc3339(offset["received_at"].as_str().unwrap()).unwrap();
    assert_eq!(got, "2026-08-20T08:00:00Z".parse::<DateTime<Utc>>().unwrap());
}

#[tokio::test]
async fn create_rejects_malformed_batch_code() {
    let app = TestApp::new();
    let (status, payload) = app.post("/api/batches", batch_body("sch-bad-code")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Bad Request");
}

#[tokio::test]
async fn create_rejects_out_of_range_fields() {
    let app = TestApp::new();

    let mut body = batch_body("SCH-20260820-0005");
    body["shelf_life_days"] = json!(45);
    let (status, _) = app.post("/api/batches", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = batch_body("SCH-20260820-0005");
    body["volume_liters"] = json!(-1.0);
    let (status, _) = app.post("/api/batches", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_duplicate_batch_code() {
    let app = TestApp::new();
    create_batch(&app, batch_body("SCH-20260820-0006")).await;

    let (status, _) = app.post("/api/batches", batch_body("SCH-20260820-0006")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_and_read_by_id_round_trip() {
    let app = TestApp::new();
    let created = create_batch(&app, batch_body("SCH-20260820-0007")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, listed) = app.get("/api/batches").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, fetched) = app.get(&format!("/api/batches/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn read_unknown_batch_is_not_found() {
    let app = TestApp::new();
    let (status, payload) = app.get("/api/batches/9999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["error"], "Not Found");
}

#[tokio::test]
async fn consume_reduces_volume_and_records_the_draw() {
    let app = TestApp::new();
    let created = create_batch(&app, batch_body("SCH-20260820-0008")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, batch) = app
        .post(
            &format!("/api/batches/{id}/consume"),
            json!({"qty": 100.5, "order_id": "ORDER-20260820-0001"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batch["volume_liters"], 399.5);
    assert_eq!(batch["version"], 2);

    let (status, records) = app.get("/admin/records").await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["batch_id"].as_i64().unwrap(), id);
    assert_eq!(records[0]["qty"], 100.5);
    assert_eq!(records[0]["order_id"], "ORDER-20260820-0001");
}

#[tokio::test]
async fn consume_rejects_overdraw_without_changing_the_batch() {
    let app = TestApp::new();
    let created = create_batch(&app, batch_body("SCH-20260820-0009")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, payload) = app
        .post(&format!("/api/batches/{id}/consume"), json!({"qty": 500.1}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");

    let (_, batch) = app.get(&format!("/api/batches/{id}")).await;
    assert_eq!(batch["volume_liters"], 500.0);
    assert_eq!(batch["version"], 1);

    let (_, records) = app.get("/admin/records").await;
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn consume_accepts_zero_qty_but_rejects_invalid_inputs() {
    let app = TestApp::new();
    let created = create_batch(&app, batch_body("SCH-20260820-0010")).await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/batches/{id}/consume");

    // zero is a valid draw: nothing debited, still audited
    let (status, batch) = app.post(&uri, json!({"qty": 0.0})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batch["volume_liters"], 500.0);
    assert_eq!(batch["version"], 2);

    let (status, _) = app.post(&uri, json!({"qty": -1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&uri, json!({"qty": 1.0, "order_id": "not-an-order"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn near_expiry_filters_by_window() {
    let app = TestApp::new();

    let soon = create_batch(
        &app,
        json!({
            "batch_code": "SCH-20260826-0001",
            "received_at": Utc::now().to_rfc3339(),
            "shelf_life_days": 1,
            "volume_liters": 50.0,
        }),
    )
    .await;
    create_batch(
        &app,
        json!({
            "batch_code": "SCH-20260826-0002",
            "received_at": Utc::now().to_rfc3339(),
            "shelf_life_days": 14,
            "volume_liters": 50.0,
        }),
    )
    .await;

    let (status, listed) = app.get("/api/batches/near-expiry?n_days=3").await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], soon["id"]);
}

#[tokio::test]
async fn near_expiry_rejects_nonpositive_window() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/batches/near-expiry?n_days=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_hides_batch_from_public_reads_but_not_admin() {
    let app = TestApp::new();
    let created = create_batch(&app, batch_body("SCH-20260820-0011")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/api/batches/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/batches/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/api/batches").await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, admin) = app.get("/admin/batches").await;
    assert_eq!(status, StatusCode::OK);
    let admin = admin.as_array().unwrap();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0]["is_deleted"], true);

    // repeat delete stays a no-op, unknown id too
    let (status, _) = app.delete(&format!("/api/batches/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete("/api/batches/424242").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn status_and_health_report_ok() {
    let app = TestApp::new();

    let (status, payload) = app.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["service"], "dairy-store-api");

    let (status, payload) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["checks"]["storage"], "healthy");
}
